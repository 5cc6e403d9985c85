//! Persisting state in a URL fragment.
//!
//! The fragment is `#!` followed by the percent-encoded JSON of the state.
//! An empty fragment stands for the default state.

use serde_json::Value;
use tracing::debug;
use voxelnav_core::constants::FRAGMENT_PREFIX;
use voxelnav_core::{Error, Result, Trackable};

/// Encode `state` as a URL fragment. Returns an empty string when the state
/// has nothing to persist.
pub fn to_fragment(state: &dyn Trackable) -> String {
    state.to_json().map_or_else(String::new, |json| {
        format!("{FRAGMENT_PREFIX}{}", urlencoding::encode(&json.to_string()))
    })
}

/// Restore `state` from a URL fragment.
///
/// A leading `#` and `!` are optional. An empty fragment resets the state.
/// Undecodable fragments are reported and leave the state untouched;
/// decodable but malformed state is restored best-effort.
pub fn restore_from_fragment(state: &dyn Trackable, fragment: &str) -> Result<()> {
    let body = fragment.strip_prefix('#').unwrap_or(fragment);
    let body = body.strip_prefix('!').unwrap_or(body);
    if body.is_empty() {
        debug!("Empty fragment, resetting state");
        state.reset();
        return Ok(());
    }

    let decoded = urlencoding::decode(body).map_err(|err| Error::Fragment(err.to_string()))?;
    let value: Value = serde_json::from_str(&decoded)?;
    state.restore_state(&value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NavigationState, Pose, VoxelSize};
    use glam::DVec3;

    fn navigation() -> NavigationState {
        NavigationState::new(Pose::with_voxel_size(VoxelSize::new()))
    }

    #[test]
    fn empty_state_has_empty_fragment() {
        assert_eq!(to_fragment(&navigation()), "");
    }

    #[test]
    fn fragment_roundtrip() {
        let source = navigation();
        source.voxel_size().set_size(DVec3::new(4.0, 4.0, 40.0));
        source
            .pose()
            .position()
            .set_voxel_coordinates(DVec3::new(12.0, 34.0, 56.0));
        source.zoom_by(2.5);

        let fragment = to_fragment(&source);
        assert!(fragment.starts_with("#!"));
        assert!(!fragment.contains('{'));

        let target = navigation();
        restore_from_fragment(&target, &fragment).unwrap();
        assert_eq!(target.to_json(), source.to_json());
        assert_eq!(target.zoom_factor(), Some(10.0));
    }

    #[test]
    fn accepts_unencoded_fragment() {
        let target = navigation();
        restore_from_fragment(&target, "#!{\"zoomFactor\":3}").unwrap();
        assert_eq!(target.zoom_factor(), Some(3.0));
    }

    #[test]
    fn empty_fragment_resets() {
        let target = navigation();
        target.set_zoom_factor(3.0);
        restore_from_fragment(&target, "#").unwrap();
        assert_eq!(target.zoom_factor(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let target = navigation();
        target.set_zoom_factor(3.0);
        let err = restore_from_fragment(&target, "#!%7Bnot-json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(target.zoom_factor(), Some(3.0));
    }
}
