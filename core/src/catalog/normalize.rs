use itertools::{Either, Itertools};
use serde_json::Value;

/// One usable audio+video encoding from the raw catalog.
///
/// `source_index` is the record's position in the raw `formats` array and is
/// the identity used for duplicate checks during selection. Two variants with
/// identical metrics but different source records are different variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoVariant {
    pub source_index: usize,
    pub format_id: String,
    pub ext: String,
    pub vcodec: String,
    pub acodec: String,
    pub height: i64,
    pub fps: f64,
    pub abr: f64,
    pub filesize: f64,
    pub score: f64,
}

/// One usable audio-only encoding from the raw catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioVariant {
    pub source_index: usize,
    pub format_id: String,
    pub ext: String,
    pub acodec: String,
    pub abr: f64,
    pub filesize: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPartition {
    pub video: Vec<VideoVariant>,
    pub audio: Vec<AudioVariant>,
}

enum Classified {
    Video(VideoVariant),
    Audio(AudioVariant),
}

/// Partition a raw extractor catalog into usable video and audio variants.
///
/// Records are dropped, not errored, when they are video-only (no audio
/// stream), have no positive height (video) or bitrate (audio), or contain a
/// field that can not be coerced to a number. One bad record never affects
/// the rest of the catalog.
pub fn normalize_catalog(formats: &[Value]) -> CatalogPartition {
    let (video, audio): (Vec<_>, Vec<_>) = formats
        .iter()
        .enumerate()
        .filter_map(|(source_index, record)| classify(source_index, record))
        .partition_map(|classified| match classified {
            Classified::Video(v) => Either::Left(v),
            Classified::Audio(a) => Either::Right(a),
        });
    CatalogPartition { video, audio }
}

fn classify(source_index: usize, record: &Value) -> Option<Classified> {
    match (codec_field(record, "vcodec"), codec_field(record, "acodec")) {
        (Some(vcodec), Some(acodec)) => {
            let height = int_field(record, "height")?;
            let fps = float_field(record, "fps")?;
            let abr = float_field(record, "abr")?;
            let filesize = float_field(record, "filesize")?;
            if height <= 0 {
                return None;
            }
            let score = height as f64 + fps / 30.0;
            Some(Classified::Video(VideoVariant {
                source_index,
                format_id: string_field(record, "format_id"),
                ext: string_field(record, "ext"),
                vcodec: vcodec.to_owned(),
                acodec: acodec.to_owned(),
                height,
                fps,
                abr,
                filesize,
                score,
            }))
        }
        (None, Some(acodec)) => {
            let abr = float_field(record, "abr")?;
            let filesize = float_field(record, "filesize")?;
            if abr <= 0.0 {
                return None;
            }
            Some(Classified::Audio(AudioVariant {
                source_index,
                format_id: string_field(record, "format_id"),
                ext: string_field(record, "ext"),
                acodec: acodec.to_owned(),
                abr,
                filesize,
            }))
        }
        // silent video-only streams and codec-less records
        _ => None,
    }
}

/// A codec field counts as present unless it is missing, null or the
/// extractor's literal `"none"` marker.
fn codec_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    match record.get(key) {
        Some(Value::String(s)) if s != "none" => Some(s.as_str()),
        _ => None,
    }
}

/// Missing, null and empty-string fields coerce to zero; numbers and numeric
/// strings coerce to their value; anything else fails the record.
fn float_field(record: &Value, key: &str) -> Option<f64> {
    match record.get(key) {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(n)) => Some(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) if s.is_empty() => Some(0.0),
        Some(Value::String(s)) => s.parse().ok(),
        Some(_) => None,
    }
}

fn int_field(record: &Value, key: &str) -> Option<i64> {
    match record.get(key) {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) if s.is_empty() => Some(0),
        Some(Value::String(s)) => s.parse().ok(),
        Some(_) => None,
    }
}

fn string_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn partitions_video_and_audio_records() {
        let formats = [
            json!({"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "aac", "height": 1080, "fps": 30, "filesize": 50_000_000}),
            json!({"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 160.0}),
        ];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition.video.len(), 1);
        assert_eq!(partition.audio.len(), 1);
        assert_eq!(partition.video[0].source_index, 0);
        assert_eq!(partition.video[0].height, 1080);
        assert_eq!(partition.video[0].score, 1081.0);
        assert_eq!(partition.audio[0].abr, 160.0);
    }

    #[test]
    fn video_only_streams_are_dropped() {
        let formats = [
            json!({"format_id": "303", "vcodec": "vp9", "acodec": "none", "height": 1080}),
            json!({"format_id": "302", "vcodec": "vp9", "height": 720}),
        ];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition, CatalogPartition::default());
    }

    #[test]
    fn zero_height_and_zero_bitrate_records_are_dropped() {
        let formats = [
            json!({"format_id": "sb0", "vcodec": "avc1", "acodec": "aac", "height": 0}),
            json!({"format_id": "sb1", "vcodec": "avc1", "acodec": "aac"}),
            json!({"format_id": "drc", "vcodec": "none", "acodec": "opus", "abr": 0}),
            json!({"format_id": "meta", "vcodec": "none", "acodec": "aac"}),
        ];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition, CatalogPartition::default());
    }

    #[test]
    fn malformed_record_is_dropped_without_affecting_the_rest() {
        let formats = [
            json!({"format_id": "bad", "vcodec": "avc1", "acodec": "aac", "height": {"nested": true}}),
            json!({"format_id": "worse", "vcodec": "avc1", "acodec": "aac", "height": "tall"}),
            json!({"format_id": "good", "vcodec": "avc1", "acodec": "aac", "height": 720}),
        ];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition.video.len(), 1);
        assert_eq!(partition.video[0].format_id, "good");
        assert_eq!(partition.video[0].source_index, 2);
    }

    #[test]
    fn numeric_strings_and_nulls_coerce() {
        let formats = [json!({
            "format_id": "22",
            "vcodec": "avc1",
            "acodec": "aac",
            "height": "720",
            "fps": null,
            "filesize": "",
        })];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition.video.len(), 1);
        assert_eq!(partition.video[0].height, 720);
        assert_eq!(partition.video[0].fps, 0.0);
        assert_eq!(partition.video[0].filesize, 0.0);
    }

    #[test]
    fn null_codec_counts_as_absent() {
        let formats = [json!({"format_id": "a", "vcodec": null, "acodec": "mp4a", "abr": 128.0})];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition.video.len(), 0);
        assert_eq!(partition.audio.len(), 1);
    }

    #[test]
    fn fps_contributes_a_thirtieth_to_the_score() {
        let formats = [
            json!({"format_id": "60", "vcodec": "avc1", "acodec": "aac", "height": 720, "fps": 60}),
        ];
        let partition = normalize_catalog(&formats);
        assert_eq!(partition.video[0].score, 722.0);
    }
}
