//! Customer management: the people and businesses behind your transactions.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod search;
mod show;

pub use create::{create_customer_endpoint, get_new_customer_page};
pub use db::{
    create_customer_tables, destroy_all_customers, destroy_customer, find_customer,
    find_customer_by_name, find_customer_with_fallback, find_or_create_customer,
    first_use_date, get_customer_note, get_customers, get_customers_by_ids, last_use_date,
    link_customer_to_journal, link_customer_to_transaction, search_customers, store_customer,
    update_customer,
};
pub use delete::{delete_customer_endpoint, get_delete_customer_page};
pub use domain::{
    CUSTOMER_NAME_MAX_LENGTH, Customer, CustomerData, CustomerFormData, CustomerId, CustomerName,
};
pub use edit::{get_edit_customer_page, update_customer_endpoint};
pub use list::get_customers_page;
pub use search::search_customers_endpoint;
pub use show::{get_customer_all_page, get_customer_page, upload_customer_attachment};
