use ingest_validation_core::contract::{InvocationDescriptor, UuidRunIds};
use ingest_validation_lambda::handlers::trigger::handle_trigger_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<InvocationDescriptor, Error> {
    handle_trigger_event(event.payload, &UuidRunIds).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
