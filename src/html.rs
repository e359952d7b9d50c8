use maud::{DOCTYPE, Markup, PreEscaped, html};

use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, prelude::ToPrimitive};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_CHECKBOX_LABEL_STYLE: &str =
    "block text-sm font-medium text-gray-900 dark:text-white";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    #[allow(dead_code)]
    ScriptLink(String),
    /// JavaScript source code.
    #[allow(dead_code)]
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Clientele" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) },
                        HeadElement::ScriptLink(path) => script src=(path) {},
                    }
                }
            }

            body hx-ext="response-targets" class="bg-gray-50 dark:bg-gray-900"
            {
                div id="alert-container" {}

                (content)
            }
        }
    }
}

/// Render a full-page error view, e.g. for 404 and 500 responses.
pub fn error_view(title: &str, code: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="text-center space-y-4"
            {
                h1 class="text-7xl font-extrabold text-blue-600 dark:text-blue-500" { (code) }
                p class="text-xl font-semibold" { (description) }
                p class="text-gray-500 dark:text-gray-400" { (fix) }

                a href="/" class=(LINK_STYLE) { "Back to safety" }
            }
        }
    };

    base(title, &[], &content)
}

/// Render the edit link and delete button pair used in table rows and cards.
///
/// `hx_target` and `hx_swap` tell HTMX which element to remove once the
/// delete request succeeds, e.g. "closest tr" and "delete".
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-swap=(hx_swap)
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

/// Shared layout for the log-in and registration forms.
pub fn log_in_register(heading: &str, form: &Markup) -> Markup {
    html! {
        main class=(FORM_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { (heading) }

                (form)
            }
        }
    }
}

/// A spinner shown while HTMX requests are in flight.
pub fn loading_spinner() -> Markup {
    html! {
        span id="indicator" class="htmx-indicator" { "..." }
    }
}

/// Format a currency amount for display, e.g. `-1,234.568 Fr`.
///
/// Exact arithmetic happens on [Decimal] before this point; this conversion
/// is for display only.
pub fn format_amount(amount: &Decimal, decimal_places: u32, symbol: &str) -> String {
    let mut formatter = Formatter::new()
        .separator(',')
        .expect("',' is a valid separator")
        .precision(Precision::Decimals(decimal_places as u8));

    let formatted = formatter.fmt2(amount.to_f64().unwrap_or_default());

    format!("{formatted} {symbol}")
}

#[cfg(test)]
mod format_amount_tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use super::format_amount;

    #[test]
    fn formats_with_three_decimal_places() {
        let amount = Decimal::from_str("-1234.567").unwrap();

        let got = format_amount(&amount, 3, "Fr");

        assert_eq!(got, "-1,234.567 Fr");
    }
}
