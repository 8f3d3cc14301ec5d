use serde::{Deserialize, Serialize};

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;

use crate::resource::ObjectUrl;

/// Hands a locally held resource to the shell under a suggested file name.
///
/// The bytes travel with the request so shells without a handle table
/// (native, tests) can write them directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveOperation {
    pub file_name: String,
    pub mime_type: String,
    pub source: ObjectUrl,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl Operation for SaveOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Save<Ev> {
    context: CapabilityContext<SaveOperation, Ev>,
}

impl<Ev> Save<Ev> {
    pub fn new(context: CapabilityContext<SaveOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Save<Ev>
where
    Ev: Send + 'static,
{
    pub fn save(&self, operation: SaveOperation) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
