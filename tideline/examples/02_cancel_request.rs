use std::sync::Arc;
use std::time::Duration;

use tideline::{Backend, CancelSource, DataRequest, Tideline};
use tideline_mock::{MockBackend, fixtures};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let tideline = Tideline::builder().with_backend(backend).build()?;

    // The TIMEOUT user answers after 200ms; cancel well before that.
    let req = DataRequest::new("TIMEOUT", "demo-cancel", fixtures::day_window());
    let source = CancelSource::new();
    let token = source.token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        source.cancel();
    });

    match tideline.aggregate(&req, &token).await {
        Ok(report) => println!("finished with {} records", report.written),
        Err(e) if e.is_cancellation() => println!("cancelled as expected: {e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
