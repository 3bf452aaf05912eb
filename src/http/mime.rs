//! MIME type detection module
//!
//! Returns the Content-Type for a stored file name, keyed on the text after
//! its last dot. Unknown or missing extensions are served as binary.

/// Get MIME Content-Type for a file name
///
/// # Examples
/// ```
/// use rangeserve::http::mime::content_type_for;
/// assert_eq!(content_type_for("trailer.MP4"), "video/mp4");
/// assert_eq!(content_type_for("archive.tar.gz"), "application/gzip");
/// assert_eq!(content_type_for("README"), "application/octet-stream");
/// ```
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    get_content_type(extension.as_deref())
}

/// Get MIME Content-Type based on a lowercase file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Video
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",

        // Streaming manifests
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("mpd") => "application/dash+xml",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("m4a" | "aac") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",

        // Documents and archives
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("7z") => "application/x-7z-compressed",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("song.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("photo.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("live.m3u8"), "application/vnd.apple.mpegurl");
    }

    #[test]
    fn test_last_extension_wins() {
        assert_eq!(content_type_for("backup.json.gz"), "application/gzip");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for("data.xyz"), "application/octet-stream");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
        assert_eq!(content_type_for("trailing."), "application/octet-stream");
    }
}
