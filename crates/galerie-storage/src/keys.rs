//! Shared key generation for blob store backends.
//!
//! Key format: `gallery/{owner_id}/{uuid}.{ext}`. All backends use the same
//! layout so a blob id derived from one backend's locator stays valid after
//! a backend migration.

use galerie_core::models::OwnerScope;
use uuid::Uuid;

const KEY_ROOT: &str = "gallery";

/// Generate a blob key for the given owner and content type.
pub fn generate_blob_key(scope: &OwnerScope, content_type: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        KEY_ROOT,
        scope.id(),
        Uuid::new_v4(),
        extension_for(content_type)
    )
}

/// The scope prefix holding all of one owner's blobs.
pub fn scope_prefix(scope: &OwnerScope) -> String {
    format!("{}/{}", KEY_ROOT, scope.id())
}

/// File extension for an allowed image content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Derive the blob id back from a locator, for the case where only the
/// display URL is at hand. Returns `None` when the locator does not contain
/// a gallery key.
pub fn blob_id_from_locator(locator: &str) -> Option<String> {
    let marker = format!("/{}/", KEY_ROOT);
    locator
        .find(&marker)
        .map(|idx| locator[idx + 1..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_owner_scoped() {
        let scope = OwnerScope(Uuid::new_v4());
        let key = generate_blob_key(&scope, "image/png");
        assert!(key.starts_with(&format!("gallery/{}/", scope.id())));
        assert!(key.ends_with(".png"));
        assert!(key.starts_with(&scope_prefix(&scope)));
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/PNG"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
    }

    #[test]
    fn test_blob_id_round_trips_through_locator() {
        let scope = OwnerScope(Uuid::new_v4());
        let key = generate_blob_key(&scope, "image/jpeg");
        let locator = format!("http://localhost:3000/media/{}", key);
        assert_eq!(blob_id_from_locator(&locator).unwrap(), key);
    }

    #[test]
    fn test_blob_id_from_foreign_locator_is_none() {
        assert_eq!(blob_id_from_locator("http://example.com/foo/bar.jpg"), None);
    }
}
