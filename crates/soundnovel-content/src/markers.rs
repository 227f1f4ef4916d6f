//! 본문 마커 추출.
//!
//! 챕터 마크업을 훑어 클래스 이름이 마커 종류와 일치하는 요소를 문서 순서대로 모은다.
//! 마크업은 HTML 조각이므로 닫히지 않은 태그나 깨진 속성은 건너뛰고 계속 읽는다.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use soundnovel_core::models::marker::{Marker, MarkerId, MarkerKind};
use tracing::{debug, warn};

/// 마크업에서 마커 목록 추출 (문서 순서, 순번은 0부터)
pub fn extract_markers(chapter_id: u32, markup: &str) -> Vec<Marker> {
    let mut reader = Reader::from_reader(markup.as_bytes());
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut buf = Vec::with_capacity(64);
    let mut markers = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if let Some((kind, src)) = marker_from_start(&reader, &e) {
                    let id = MarkerId::new(chapter_id, markers.len());
                    markers.push(Marker { id, kind, src });
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "{chapter_id}장 마크업 파싱 중단 (위치 {}): {e}",
                    reader.buffer_position()
                );
                break;
            }
        }
        buf.clear();
    }

    debug!("{chapter_id}장 마커 {}개 추출", markers.len());
    markers
}

fn marker_from_start(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Option<(MarkerKind, Option<String>)> {
    let mut kind = None;
    let mut src = None;

    for attr in start.attributes().flatten() {
        let key = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(v) => v.to_ascii_lowercase(),
            Err(_) => continue,
        };
        let value = match reader.decoder().decode(&attr.value) {
            Ok(v) => v.trim().to_string(),
            Err(_) => continue,
        };
        match key.as_str() {
            "class" => kind = value.split_whitespace().find_map(MarkerKind::from_class),
            "data-src" if !value.is_empty() => src = Some(value),
            _ => {}
        }
    }

    let kind = kind?;
    if kind.requires_source() && src.is_none() {
        debug!("소스 없는 {kind} 마커 무시");
        return None;
    }
    Some((kind, src))
}
