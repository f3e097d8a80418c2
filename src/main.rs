//! Minimal operator CLI for the credential store. Commands are intentionally
//! small and auditable so operators can see exactly how credentials are
//! handled; key provisioning happens elsewhere.

use std::env;

use credkeep::config::StoreConfig;
use credkeep::crypto::hashing::sha256_hex;

fn print_usage() {
    eprintln!(
        "Commands:\n  load-users <config.json>\n  add-user <config.json> <username> <password>\n  hash <input>"
    );
}

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "load-users" => {
            if args.len() != 3 {
                return print_usage();
            }
            let config = match StoreConfig::load(&args[2]) {
                Ok(config) => config,
                Err(err) => return eprintln!("config load failed: {err}"),
            };
            let store = config.open_store();
            match store.load() {
                Ok(()) => println!("{} user(s) loaded", store.user_count()),
                Err(err) => eprintln!("load failed: {err}"),
            }
        }
        "add-user" => {
            if args.len() != 5 {
                return print_usage();
            }
            let config = match StoreConfig::load(&args[2]) {
                Ok(config) => config,
                Err(err) => return eprintln!("config load failed: {err}"),
            };
            let store = config.open_store();
            if let Err(err) = store.load() {
                return eprintln!("load failed: {err}");
            }
            if !store.add_user(&args[3], &args[4]) {
                return println!("rejected");
            }
            match store.save() {
                Ok(()) => println!("added"),
                Err(err) => eprintln!("save failed, user not persisted: {err}"),
            }
        }
        "hash" => {
            if args.len() != 3 {
                return print_usage();
            }
            println!("{}", sha256_hex(args[2].as_bytes()));
        }
        _ => print_usage(),
    }
}
