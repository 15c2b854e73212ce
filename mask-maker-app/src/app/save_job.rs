use std::path::PathBuf;

use futures::FutureExt;
use log::info;
use mask_maker::{AsyncTask, MaskError, PixelBuffer};

use super::menu::SaveTarget;

/// Encodes and writes an image on a worker thread
pub(super) struct SaveJob {
    target: SaveTarget,
    task: AsyncTask<Result<PathBuf, MaskError>>,
}

impl SaveJob {
    pub fn spawn(target: SaveTarget, snapshot: PixelBuffer, path: PathBuf) -> Self {
        let (tx, rx) = futures::channel::oneshot::channel();
        info!("Store {} at: {}", target.label(), path.display());

        std::thread::spawn(move || {
            let r = snapshot.save(&path).map(|()| path);
            // Receiver is gone if the app closed in the meantime
            let _ = tx.send(r);
        });
        let task = AsyncTask::new(
            async move {
                rx.await
                    .map_err(|e| MaskError::Io(std::io::Error::other(e)))
                    .and_then(|r| r)
            }
            .boxed(),
        );
        Self { target, task }
    }

    pub fn target(&self) -> SaveTarget {
        self.target
    }

    pub fn poll(&mut self) -> Option<Result<PathBuf, MaskError>> {
        self.task.data()
    }
}
