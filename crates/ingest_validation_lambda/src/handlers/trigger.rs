use ingest_validation_core::contract::{
    resolve_invocation, InvalidInput, InvocationDescriptor, InvocationRequest, RunIdGenerator,
};
use serde_json::{json, Value};

use crate::logging::{log_error, log_info};

const COMPONENT: &str = "trigger_handler";

/// Turn a raw trigger event into an invocation descriptor for the partition
/// job.
pub fn handle_trigger_event(
    event: Value,
    run_ids: &impl RunIdGenerator,
) -> Result<InvocationDescriptor, InvalidInput> {
    let outcome = parse_request(event).and_then(|request| resolve_invocation(request, run_ids));

    match &outcome {
        Ok(descriptor) => log_info(
            COMPONENT,
            "invocation_resolved",
            json!({
                "input_bucket": descriptor.input_bucket.clone(),
                "input_key": descriptor.input_key.clone(),
                "run_id": descriptor.run_id.clone(),
            }),
        ),
        Err(error) => log_error(
            COMPONENT,
            "invocation_rejected",
            json!({
                "field": error.field(),
                "error": error.message(),
            }),
        ),
    }

    outcome
}

fn parse_request(event: Value) -> Result<InvocationRequest, InvalidInput> {
    // Derived structs also deserialize from sequences; only objects are requests.
    if !event.is_object() {
        return Err(InvalidInput::new(
            "Malformed request: event must be a JSON object",
        ));
    }
    serde_json::from_value::<InvocationRequest>(event)
        .map_err(|error| InvalidInput::new(format!("Malformed request: {error}")))
}
