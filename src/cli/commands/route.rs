use serde::Serialize;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::route::{classify, RouteClass};

#[derive(Debug, Serialize)]
struct Classification<'a> {
    path: &'a str,
    class: RouteClass,
}

pub fn handle(paths: &[String], output_format: OutputFormat) -> anyhow::Result<()> {
    let classified: Vec<Classification> = paths
        .iter()
        .map(|path| Classification {
            path: path.as_str(),
            class: classify(path),
        })
        .collect();

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Classified {} path(s)", classified.len()),
            Some(json!({ "routes": classified })),
        ),
        OutputFormat::Text => {
            for item in &classified {
                println!("{:<10} {}", item.class, item.path);
            }
            Ok(())
        }
    }
}
