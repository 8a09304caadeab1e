use guide_engine::{SseDecoder, SseFrame};
use pretty_assertions::assert_eq;

#[test]
fn frames_complete_across_chunk_boundaries() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: {\"a\"").is_empty());
    assert_eq!(
        decoder.push(b":1}\n\ndata: [DO"),
        vec![SseFrame::Data("{\"a\":1}".to_string())]
    );
    assert_eq!(decoder.push(b"NE]\n\n"), vec![SseFrame::Done]);
}

#[test]
fn multibyte_characters_survive_split_chunks() {
    let line = "data: caf\u{e9} \u{2013} na\u{ef}ve\n".as_bytes();
    let split = line.len() - 4;
    let mut decoder = SseDecoder::new();

    let mut frames = decoder.push(&line[..split]);
    frames.extend(decoder.push(&line[split..]));
    assert_eq!(
        frames,
        vec![SseFrame::Data("caf\u{e9} \u{2013} na\u{ef}ve".to_string())]
    );
}

#[test]
fn trailing_line_is_flushed_on_finish() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: tail").is_empty());
    assert_eq!(decoder.finish(), Some(SseFrame::Data("tail".to_string())));
    assert_eq!(decoder.finish(), None);
}
