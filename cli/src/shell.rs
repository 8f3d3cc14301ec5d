//! Drives the core: feeds events in and runs the effects it asks for until
//! none are left.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::Context;
use crux_core::Core;
use promptgen_shared::capabilities::{HttpOperation, SaveOperation};
use promptgen_shared::{App, Capabilities, Effect, Event, ViewModel};
use tracing::{debug, info};

use crate::transport::Transport;

pub struct Shell {
    core: Core<Effect, App>,
    transport: Transport,
    out_dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl Shell {
    pub fn new(transport: Transport, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            core: Core::new::<Capabilities>(),
            transport,
            out_dir: out_dir.into(),
            saved: Vec::new(),
        }
    }

    pub async fn dispatch(&mut self, event: Event) -> anyhow::Result<()> {
        debug!(event = event.name(), "dispatch");
        let mut queue: VecDeque<Effect> = self.core.process_event(event).into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Render(_) => {}
                Effect::Http(mut request) => {
                    let HttpOperation::Execute(http) = &request.operation;
                    let result = self.transport.execute(http).await;
                    queue.extend(self.core.resolve(&mut request, result));
                }
                Effect::Save(request) => {
                    let path = self.write(&request.operation).await?;
                    self.saved.push(path);
                }
            }
        }
        Ok(())
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// Files written for `Save` effects, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    async fn write(&self, save: &SaveOperation) -> anyhow::Result<PathBuf> {
        // Only the final component of the suggested name is trusted.
        let file_name = Path::new(&save.file_name)
            .file_name()
            .context("save request without a usable file name")?;
        let path = self.out_dir.join(file_name);

        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        tokio::fs::write(&path, &save.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(path = %path.display(), size = save.bytes.len(), source = %save.source, "file saved");
        Ok(path)
    }
}
