//! Concrete wire messages.

use colony_core::request::TransferRequest;
use colony_core::TransferOutcome;
use tracing::debug;

use crate::error::ServerError;
use crate::network::{LogicalSide, Message, ServerContext};

/// Client asks the server to move items from the sender into a citizen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItemsToCitizenMessage {
    /// The carried request.
    pub request: TransferRequest,
}

impl TransferItemsToCitizenMessage {
    /// Wrap a request.
    #[must_use]
    pub fn new(request: TransferRequest) -> Self {
        Self { request }
    }
}

impl Message for TransferItemsToCitizenMessage {
    const ID: u8 = 0x21;
    const NAME: &'static str = "transfer_items_to_citizen";

    fn encode(&self) -> Result<Vec<u8>, ServerError> {
        Ok(self.request.to_bytes()?)
    }

    fn decode(payload: &[u8]) -> Result<Self, ServerError> {
        Ok(Self::new(TransferRequest::from_bytes(payload)?))
    }

    fn execution_side(&self) -> Option<LogicalSide> {
        Some(LogicalSide::Server)
    }

    fn on_execute(self, ctx: &mut ServerContext<'_>, is_logical_server: bool) {
        if !is_logical_server {
            return;
        }
        let outcome = ctx
            .executor
            .execute(self.request, &mut *ctx.colonies, &mut *ctx.sender);
        if let TransferOutcome::Completed(report) = &outcome {
            debug!(
                player = ctx.sender.name(),
                deposited = report.deposited(),
                "Citizen transfer applied"
            );
        }
    }
}
