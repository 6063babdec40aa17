use std::sync::Arc;
use std::time::Duration;

use tideline::{Backend, CancelToken, DataRequest, Include, Tideline};
use tideline_mock::{MockBackend, fixtures};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Log to stderr; RUST_LOG=tideline=debug shows the per-source spans.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // 2. One mock backend serves every role from fixtures.
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let tideline = Tideline::builder()
        .with_backend(backend)
        .source_timeout(Duration::from_secs(2))
        .request_timeout(Duration::from_secs(5))
        .build()?;

    // 3. Ask for the fixture day with every optional source.
    let req = DataRequest::new("user-1", "demo-trace", fixtures::day_window())
        .include(Include::all())
        .session_token("demo-token");

    // 4. Aggregate and print the JSON array.
    let report = tideline.aggregate(&req, &CancelToken::never()).await?;
    println!("{}", String::from_utf8_lossy(&report.body));
    eprintln!(
        "written={} skipped={} first_error={:?}",
        report.written, report.skipped, report.first_error
    );
    Ok(())
}
