//! Option groups with a typed finalizer.
//!
//! `--point X Y` is a repeatable option whose two tokens are split by a
//! nested schema; the finalizer folds the groups into a polyline. The schema
//! is declared in YAML to show the descriptor path.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argsplit-demos --example groups -- --point 0 0 --point 3 4 --closed
//! ```

use argsplit_core::{ArgumentBag, Splitter, ValueError};
use argsplit_descriptor::SchemaDescriptor;

const POLYLINE: &str = r#"
name: polyline
fields:
  - kind: flag
    names: [--closed]
    help: Join the last point to the first
  - kind: repeatable
    names: [-p, --point]
    help: A vertex
    schema:
      fields:
        - kind: required
          names: [x]
          shape: float
        - kind: required
          names: [y]
          shape: float
"#;

#[derive(Debug)]
struct Polyline {
    points: Vec<(f64, f64)>,
    closed: bool,
}

impl Polyline {
    fn length(&self) -> f64 {
        let mut segments: Vec<_> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            segments.push((self.points[self.points.len() - 1], self.points[0]));
        }
        segments
            .iter()
            .map(|((x1, y1), (x2, y2))| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt())
            .sum()
    }
}

fn polyline(bag: ArgumentBag) -> Result<Polyline, ValueError> {
    let groups: Vec<ArgumentBag> = bag.value("--point")?;
    let points = groups
        .iter()
        .map(|point| -> Result<(f64, f64), ValueError> {
            Ok((point.value("x")?, point.value("y")?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polyline {
        points,
        closed: bag.value("--closed")?,
    })
}

fn main() {
    let descriptor = SchemaDescriptor::from_yaml(POLYLINE).unwrap();
    let schema = descriptor.build().unwrap().map(polyline);
    let splitter = Splitter::new(schema).unwrap();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        args = ["--point", "0", "0", "-p", "3", "4", "--point", "3", "0", "--closed"]
            .map(String::from)
            .to_vec();
    }

    match splitter.split(args) {
        Ok(line) => println!("{line:?}\nlength = {:.2}", line.length()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
