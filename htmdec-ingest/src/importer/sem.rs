//! SEM strategy: image files paired with a header sidecar

use htmdec_common::events::ResourceType;
use htmdec_common::models::ParentRef;
use std::path::Path;
use tracing::warn;

use super::{ImportContext, ImportItem};
use crate::error::ImportResult;

pub const SEM_TAG: &str = "sem";
pub const IMAGE_MIME: &str = "image/tiff";
pub const HEADER_MIME: &str = "text/plain";

#[derive(Debug, Clone, Copy, Default)]
pub struct SemStrategy;

/// Sidecar header name of an image: `sample.tif` -> `sample-tif.hdr`
pub fn header_name(image_name: &str) -> String {
    format!("{}.hdr", image_name.replacen(".tif", "-tif", 1))
}

impl ImportItem for SemStrategy {
    fn import_item(
        &self,
        ctx: &ImportContext<'_>,
        parent: &ParentRef,
        name: &str,
        import_path: &Path,
    ) -> ImportResult<()> {
        let image_path = import_path.join(name);
        let header = header_name(name);
        let header_path = import_path.join(&header);

        // an item is never created without its header
        if !header_path.is_file() {
            warn!(
                "Importing {} failed because of missing header",
                image_path.display()
            );
            ctx.record(|s| s.missing_headers += 1);
            return Ok(());
        }

        let item = ctx.tagged_item(parent, name, SEM_TAG)?;
        ctx.announce(item.id, ResourceType::Item, &image_path);

        for (file_name, path, mime_type) in [
            (name, &image_path, IMAGE_MIME),
            (header.as_str(), &header_path, HEADER_MIME),
        ] {
            ctx.offer_file(&item, path, file_name, || Ok(mime_type.to_string()))?;
        }
        Ok(())
    }
}
