use crate::error::{Error, Result};

const MAX_VIDEO_ID_LEN: usize = 128;

/// Pull the video id out of the usual YouTube URL shapes, or accept a bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    let raw_id = if let Some(v_param) = input.split("v=").nth(1) {
        v_param.split('&').next().unwrap_or(v_param)
    } else if let Some(short) = input.split("youtu.be/").nth(1) {
        short.split('?').next().unwrap_or(short)
    } else if let Some(shorts) = input.split("/shorts/").nth(1) {
        shorts.split(['?', '/']).next().unwrap_or(shorts)
    } else {
        input
    };

    sanitize_video_id(raw_id).ok()
}

/// Ensure a video identifier is safe to persist and hand to other services.
/// Only ASCII alphanumeric characters plus `_` and `-` are allowed.
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::validation("Video ID cannot be empty"));
    }

    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::validation("Video ID is unexpectedly long"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(Error::validation(
            "Video ID contains unsupported characters; expected only letters, numbers, '-' or '_'",
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{MAX_VIDEO_ID_LEN, extract_video_id, sanitize_video_id};

    #[test]
    fn allows_expected_characters() {
        let id = sanitize_video_id("abcDEF123-_x").expect("valid ID");
        assert_eq!(id, "abcDEF123-_x");
    }

    #[test]
    fn rejects_empty() {
        assert!(sanitize_video_id("   ").is_err());
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(sanitize_video_id("abc/../../etc").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "a".repeat(MAX_VIDEO_ID_LEN + 1);
        assert!(sanitize_video_id(&long).is_err());
    }

    #[test]
    fn extracts_from_url_shapes() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/abc_123?feature=share").as_deref(),
            Some("abc_123")
        );
        assert_eq!(extract_video_id(" dQw4w9WgXcQ ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(extract_video_id("https://example.com/a b"), None);
    }
}
