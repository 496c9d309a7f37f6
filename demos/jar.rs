//! `jar`-tool clone.
//!
//! Declares flags, a repeatable define, two required positionals and a
//! `help` branch, then splits the process arguments (or a canned sample when
//! none are given).
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argsplit-demos --example jar -- -v -D a=1 app.jar com.example.Main
//! cargo run -p argsplit-demos --example jar -- help manifest
//! ```

use std::path::PathBuf;

use argsplit_core::{ArgumentBag, OptionSchema, Schema, Shape, SplitError, Splitter};

#[derive(Debug)]
enum Jar {
    Run {
        verbose: bool,
        defines: Vec<String>,
        jar: PathBuf,
        main: String,
    },
    Help {
        topic: String,
    },
}

fn schema() -> Schema<Jar> {
    let help = Schema::new(vec![
        OptionSchema::required("topic", Shape::String).with_help("Topic to explain"),
    ])
    .unwrap();

    Schema::with_finalizer(
        vec![
            OptionSchema::flag(["-v", "--verbose"]).with_help("Print more output"),
            OptionSchema::repeatable(["-D", "--define"], Shape::String)
                .with_help("Define a property (key=value)"),
            OptionSchema::required("jar", Shape::Path).with_help("Archive to run"),
            OptionSchema::required("main", Shape::String).with_help("Main class"),
            OptionSchema::branch("help", help).with_help("Explain a topic"),
        ],
        |mut bag| {
            if let Some(help) = bag.take::<Option<ArgumentBag>>("help")? {
                return Ok(Jar::Help {
                    topic: help.value("topic")?,
                });
            }
            Ok(Jar::Run {
                verbose: bag.value("-v")?,
                defines: bag.take("-D")?,
                jar: bag.take("jar")?,
                main: bag.take("main")?,
            })
        },
    )
    .unwrap()
}

fn main() {
    let splitter = Splitter::new(schema()).unwrap();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        args = ["-v", "--define=a=1,b=2", "app.jar", "com.example.Main"]
            .map(String::from)
            .to_vec();
        println!("No arguments given, using: {}", args.join(" "));
    }

    match splitter.split(args) {
        Ok(jar) => println!("{jar:#?}"),
        Err(SplitError::MissingArgument(name)) => {
            eprintln!("missing <{name}>\n");
            eprint!("{}", splitter.help());
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
