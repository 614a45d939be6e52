use pipeline_stream::prelude::*;
use pipeline_stream::init_observability;

/// Prints every stage to the terminal.
struct ConsolePort;

impl PresentationPort for ConsolePort {
    fn reset_results(&mut self) {}

    fn set_status(&mut self, text: &str) {
        println!("[status] {text}");
    }

    fn set_busy(&mut self, _busy: bool) {}

    fn set_submit_enabled(&mut self, _enabled: bool) {}

    fn show_sql(&mut self, sql: &str) {
        println!("\n{sql}\n");
    }

    fn show_table(&mut self, table: &TableData) {
        if table.is_empty() {
            println!("No data returned.");
            return;
        }
        println!("{}", table.columns.join(" | "));
        for row in table.display_rows() {
            println!("{}", row.join(" | "));
        }
    }

    fn show_recommendation(&mut self, kind: &str) {
        println!("[chart] recommended: {kind}");
    }

    fn show_chart_placeholder(&mut self, placeholder: &ChartPlaceholder) {
        println!("[chart] {}", placeholder.message());
    }

    fn show_insight(&mut self, html: &str) {
        println!("\n{html}");
    }

    fn show_done(&mut self, message: &str) {
        println!("{message}");
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Dumps the figure as Plotly JSON.
struct JsonPlotter;

impl PlotRenderer for JsonPlotter {
    fn react(&mut self, figure: &Figure) -> Result<(), PlotError> {
        let json = serde_json::to_string_pretty(&figure.to_json())
            .map_err(|e| PlotError(e.to_string()))?;
        println!("{json}");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    let _ = dotenvy::dotenv();
    init_observability();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let client = PipelineClient::from_env()?;
    let mut dispatcher = client.dispatcher(ConsolePort, JsonPlotter);

    let state = client
        .run(&QueryRequest::new(question), &mut dispatcher)
        .await?;
    if let RunState::Failed(failure) = state {
        eprintln!("run failed: {failure}");
        std::process::exit(1);
    }
    Ok(())
}
