//! Message chunking for transport size limits.
//!
//! Chat transports cap the size of a single message, so long AI answers
//! are split into several messages. Splits happen at line boundaries
//! wherever possible; a single line is broken up only when it alone
//! exceeds the limit.

/// Splits `text` into chunks of at most `limit` characters.
///
/// Lines are packed greedily: a line joins the current chunk when it fits
/// together with the separating newline, otherwise it starts a new chunk.
/// A line longer than `limit` is hard-split at character boundaries into
/// its own run of chunks. Joining line-aligned chunks with `"\n"` restores
/// the original text.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let limit = limit.max(1);

    fn flush(chunks: &mut Vec<String>, buffer: &mut String, has_content: &mut bool) {
        if *has_content {
            chunks.push(std::mem::take(buffer));
            *has_content = false;
        }
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;
    let mut has_content = false;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > limit {
            flush(&mut chunks, &mut buffer, &mut has_content);
            buffer_len = 0;
            let mut piece = String::new();
            let mut piece_len = 0usize;
            for ch in line.chars() {
                if piece_len == limit {
                    chunks.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
                piece.push(ch);
                piece_len += 1;
            }
            if !piece.is_empty() {
                chunks.push(piece);
            }
            continue;
        }

        if !has_content {
            buffer.push_str(line);
            buffer_len = line_len;
            has_content = true;
        } else if buffer_len + 1 + line_len <= limit {
            buffer.push('\n');
            buffer.push_str(line);
            buffer_len += 1 + line_len;
        } else {
            flush(&mut chunks, &mut buffer, &mut has_content);
            buffer.push_str(line);
            buffer_len = line_len;
            has_content = true;
        }
    }
    flush(&mut chunks, &mut buffer, &mut has_content);

    chunks
}
