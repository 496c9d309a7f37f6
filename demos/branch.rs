//! Nested branch dispatch.
//!
//! A `help` branch owns the rest of the input and declares its own `detail`
//! branch, so `help hello detail world` is split over three schema levels.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argsplit-demos --example branch
//! ```

use argsplit_core::{OptionSchema, Schema, Shape, Splitter};

fn main() {
    let detail = Schema::new(vec![OptionSchema::required("level", Shape::String)]).unwrap();
    let help = Schema::new(vec![
        OptionSchema::required("topic", Shape::String),
        OptionSchema::branch("detail", detail),
    ])
    .unwrap();
    let schema = Schema::new(vec![
        OptionSchema::flag(["-v", "--verbose"]),
        OptionSchema::required("jar", Shape::Path),
        OptionSchema::required("main", Shape::String),
        OptionSchema::branch("help", help),
    ])
    .unwrap();
    let splitter = Splitter::new(schema).unwrap();

    for tokens in [
        vec!["help", "hello", "detail", "world"],
        vec!["help", "hello"],
        vec!["-v", "foo.jar", "foo.bar"],
    ] {
        println!("$ jar {}", tokens.join(" "));
        match splitter.split(tokens) {
            Ok(bag) => println!("{}\n", serde_json::to_string_pretty(&bag).unwrap()),
            Err(err) => println!("error: {err}\n"),
        }
    }
}
