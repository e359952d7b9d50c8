//! Admin tool that creates a user from the command line.
//!
//! Prompts for the password twice so typos do not lock the new user out.

use clap::Parser;
use rusqlite::Connection;

use clientele::{PasswordHash, ValidatedPassword, create_user, initialize_db};

/// Create a user account in the application database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The new user's email address.
    #[arg(long)]
    email: String,

    /// Mark the new user as a demo account. Demo accounts cannot upload files.
    #[arg(long, default_value_t = false)]
    demo: bool,
}

fn main() {
    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("Could not open database");
    initialize_db(&connection).expect("Could not initialize database");

    let password = rpassword::prompt_password("Password: ").expect("Could not read password");
    let confirmation =
        rpassword::prompt_password("Confirm password: ").expect("Could not read password");

    if password != confirmation {
        eprintln!("Passwords do not match.");
        std::process::exit(1);
    }

    let password = match ValidatedPassword::new(&password, &[&args.email]) {
        Ok(password) => password,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };
    let password_hash = PasswordHash::new(password).expect("Could not hash password");

    match create_user(&args.email, password_hash, args.demo, &connection) {
        Ok(user) => println!("Created user {} ({})", user.id, user.email),
        Err(error) => {
            eprintln!("Could not create user: {error}");
            std::process::exit(1);
        }
    }
}
