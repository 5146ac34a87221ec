use super::normalize::{AudioVariant, CatalogPartition, VideoVariant};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectedEncoding {
    Video(VideoVariant),
    Audio(AudioVariant),
}

impl SelectedEncoding {
    pub fn source_index(&self) -> usize {
        match self {
            SelectedEncoding::Video(v) => v.source_index,
            SelectedEncoding::Audio(a) => a.source_index,
        }
    }

    pub fn format_id(&self) -> &str {
        match self {
            SelectedEncoding::Video(v) => &v.format_id,
            SelectedEncoding::Audio(a) => &a.format_id,
        }
    }
}

/// Narrow a normalized catalog down to a small representative set:
/// the best quality, a spread of up to three middle qualities, one low (but
/// not lowest) quality, and the best audio-only variant.
///
/// The exact picking arithmetic below (the `/ 3` step through the middle
/// range, the `len / 4` low pick) is a long-standing client-visible contract;
/// changing it changes which formats users see for the same catalog.
pub fn select_representative(catalog: &CatalogPartition) -> Vec<SelectedEncoding> {
    let mut selected: Vec<SelectedEncoding> = Vec::new();
    let mut picked: Vec<usize> = Vec::new();

    if !catalog.video.is_empty() {
        // descending by score, ties keep catalog order
        let mut ranked: Vec<&VideoVariant> = catalog.video.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        selected.push(SelectedEncoding::Video(ranked[0].clone()));
        picked.push(ranked[0].source_index);

        if ranked.len() > 4 {
            // spread-sample three entries from between the best and the worst
            let middle = &ranked[1..ranked.len() - 1];
            let step = middle.len() / 3;
            if step > 0 {
                for i in 0..3 {
                    let idx = (i * step).min(middle.len() - 1);
                    if !picked.contains(&middle[idx].source_index) {
                        selected.push(SelectedEncoding::Video(middle[idx].clone()));
                        picked.push(middle[idx].source_index);
                    }
                }
            }
        }

        if ranked.len() > 2 {
            let low_idx = (ranked.len() / 4).max(1);
            let low = ranked[ranked.len() - low_idx];
            if !picked.contains(&low.source_index) {
                selected.push(SelectedEncoding::Video(low.clone()));
                picked.push(low.source_index);
            }
        }
    }

    if !catalog.audio.is_empty() {
        let mut ranked: Vec<&AudioVariant> = catalog.audio.iter().collect();
        ranked.sort_by(|a, b| b.abr.total_cmp(&a.abr));
        selected.push(SelectedEncoding::Audio(ranked[0].clone()));
    }

    selected
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn video(source_index: usize, height: i64, fps: f64) -> VideoVariant {
        VideoVariant {
            source_index,
            format_id: format!("f{source_index}"),
            ext: "mp4".to_owned(),
            vcodec: "avc1".to_owned(),
            acodec: "aac".to_owned(),
            height,
            fps,
            abr: 0.0,
            filesize: 0.0,
            score: height as f64 + fps / 30.0,
        }
    }

    fn audio(source_index: usize, abr: f64) -> AudioVariant {
        AudioVariant {
            source_index,
            format_id: format!("f{source_index}"),
            ext: "webm".to_owned(),
            acodec: "opus".to_owned(),
            abr,
            filesize: 0.0,
        }
    }

    fn heights(selection: &[SelectedEncoding]) -> Vec<i64> {
        selection
            .iter()
            .map(|s| match s {
                SelectedEncoding::Video(v) => v.height,
                SelectedEncoding::Audio(_) => -1,
            })
            .collect()
    }

    #[test]
    fn empty_catalog_selects_nothing() {
        assert!(select_representative(&CatalogPartition::default()).is_empty());
    }

    #[test]
    fn single_video_selects_exactly_that_video() {
        let catalog = CatalogPartition {
            video: vec![video(0, 720, 30.0)],
            audio: vec![],
        };
        let selection = select_representative(&catalog);
        assert_eq!(selection, vec![SelectedEncoding::Video(video(0, 720, 30.0))]);
    }

    #[test]
    fn two_videos_select_only_the_best() {
        // two entries pass neither the > 4 middle gate nor the > 2 low gate
        let catalog = CatalogPartition {
            video: vec![video(0, 1080, 30.0), video(1, 480, 30.0)],
            audio: vec![],
        };
        assert_eq!(heights(&select_representative(&catalog)), vec![1080]);
    }

    #[test]
    fn two_videos_plus_audio_yields_best_video_then_audio() {
        let catalog = CatalogPartition {
            video: vec![video(0, 1080, 30.0), video(1, 480, 30.0)],
            audio: vec![audio(2, 128.0)],
        };
        let selection = select_representative(&catalog);
        assert_eq!(heights(&selection), vec![1080, -1]);
        assert_eq!(selection[1], SelectedEncoding::Audio(audio(2, 128.0)));
    }

    #[test]
    fn three_videos_add_the_low_tier_pick() {
        // len 3: no middle sampling (needs > 4); low pick is
        // ranked[3 - max(3/4, 1)] = ranked[2], the lowest entry
        let catalog = CatalogPartition {
            video: vec![video(0, 1080, 30.0), video(1, 720, 30.0), video(2, 360, 30.0)],
            audio: vec![],
        };
        assert_eq!(heights(&select_representative(&catalog)), vec![1080, 360]);
    }

    #[test]
    fn seven_videos_sample_top_middle_spread_and_low() {
        // sorted heights: 2160 1440 1080 720 480 360 240
        // middle = [1440 1080 720 480 360], step = 1, picks 1440 1080 720
        // low_idx = max(7/4, 1) = 1, picks index 6 = 240
        let catalog = CatalogPartition {
            video: (0..7)
                .map(|i| video(i, [2160, 1440, 1080, 720, 480, 360, 240][i], 30.0))
                .collect(),
            audio: vec![],
        };
        assert_eq!(
            heights(&select_representative(&catalog)),
            vec![2160, 1440, 1080, 720, 240]
        );
    }

    #[test]
    fn five_videos_cover_every_tier() {
        // middle = [3 entries], step = 1, indices 0 1 2;
        // low_idx = max(5/4, 1) = 1 picks the very last entry
        let catalog = CatalogPartition {
            video: (0..5)
                .map(|i| video(i, [1080, 720, 480, 360, 240][i], 30.0))
                .collect(),
            audio: vec![],
        };
        assert_eq!(
            heights(&select_representative(&catalog)),
            vec![1080, 720, 480, 360, 240]
        );
    }

    #[test]
    fn six_videos_skip_the_unsampled_middle_entry() {
        // middle = [4 entries], step = 4 / 3 = 1, indices 0 1 2 leave the
        // fourth middle entry (360) unpicked
        let catalog = CatalogPartition {
            video: (0..6)
                .map(|i| video(i, [2160, 1080, 720, 480, 360, 240][i], 30.0))
                .collect(),
            audio: vec![],
        };
        // low_idx = max(6/4, 1) = 1 -> last entry
        assert_eq!(
            heights(&select_representative(&catalog)),
            vec![2160, 1080, 720, 480, 240]
        );
    }

    #[test]
    fn duplicate_values_from_distinct_records_both_selectable() {
        // five records, all 720p: value-equal but identity-distinct.
        // middle = 3 entries with step 1; all three get picked because the
        // duplicate check is by source record, not by value.
        let catalog = CatalogPartition {
            video: (0..5).map(|i| video(i, 720, 30.0)).collect(),
            audio: vec![],
        };
        let selection = select_representative(&catalog);
        let indices: Vec<usize> = selection.iter().map(|s| s.source_index()).collect();
        // stable sort keeps catalog order; low pick (index 4) is new as well
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn score_ties_resolve_to_catalog_order() {
        // equal scores: stable sort must keep the earlier record first
        let catalog = CatalogPartition {
            video: vec![video(0, 720, 30.0), video(1, 720, 30.0), video(2, 1080, 30.0)],
            audio: vec![],
        };
        let selection = select_representative(&catalog);
        assert_eq!(selection[0].source_index(), 2);
        // low pick: sorted order is [2, 0, 1], low_idx 1 -> record 1
        assert_eq!(selection[1].source_index(), 1);
    }

    #[test]
    fn audio_is_best_bitrate_and_always_last() {
        let catalog = CatalogPartition {
            video: vec![video(0, 1080, 30.0)],
            audio: vec![audio(1, 64.0), audio(2, 160.0), audio(3, 128.0)],
        };
        let selection = select_representative(&catalog);
        assert_eq!(selection.len(), 2);
        assert_eq!(
            selection.last().unwrap(),
            &SelectedEncoding::Audio(audio(2, 160.0))
        );
    }

    #[test]
    fn audio_only_catalog_selects_single_audio_entry() {
        let catalog = CatalogPartition {
            video: vec![],
            audio: vec![audio(0, 128.0), audio(1, 256.0)],
        };
        let selection = select_representative(&catalog);
        assert_eq!(selection, vec![SelectedEncoding::Audio(audio(1, 256.0))]);
    }

    proptest! {
        #[test]
        fn selection_is_bounded_and_duplicate_free(
            video_heights in prop::collection::vec(1i64..5000, 0..40),
            audio_bitrates in prop::collection::vec(1.0f64..512.0, 0..10),
        ) {
            let video: Vec<VideoVariant> = video_heights
                .iter()
                .enumerate()
                .map(|(i, h)| video(i, *h, 30.0))
                .collect();
            let audio: Vec<AudioVariant> = audio_bitrates
                .iter()
                .enumerate()
                .map(|(i, abr)| audio(video.len() + i, *abr))
                .collect();
            let selection = select_representative(&CatalogPartition { video, audio });

            let video_picks = selection
                .iter()
                .filter(|s| matches!(s, SelectedEncoding::Video(_)))
                .count();
            let audio_picks = selection.len() - video_picks;
            prop_assert!(video_picks <= 5);
            prop_assert!(audio_picks <= 1);

            let mut indices: Vec<usize> = selection.iter().map(|s| s.source_index()).collect();
            indices.sort_unstable();
            indices.dedup();
            prop_assert_eq!(indices.len(), selection.len());
        }

        #[test]
        fn first_pick_is_the_maximum_score(
            video_heights in prop::collection::vec(1i64..5000, 1..40),
        ) {
            let video: Vec<VideoVariant> = video_heights
                .iter()
                .enumerate()
                .map(|(i, h)| video(i, *h, 30.0))
                .collect();
            let max = video
                .iter()
                .map(|v| v.score)
                .fold(f64::NEG_INFINITY, f64::max);
            let selection = select_representative(&CatalogPartition { video, audio: vec![] });
            match &selection[0] {
                SelectedEncoding::Video(v) => prop_assert_eq!(v.score, max),
                SelectedEncoding::Audio(_) => prop_assert!(false, "first pick must be video"),
            }
        }

        #[test]
        fn audio_when_present_is_represented_and_last(
            video_heights in prop::collection::vec(1i64..5000, 0..40),
            audio_bitrates in prop::collection::vec(1.0f64..512.0, 1..10),
        ) {
            let video: Vec<VideoVariant> = video_heights
                .iter()
                .enumerate()
                .map(|(i, h)| video(i, *h, 30.0))
                .collect();
            let audio: Vec<AudioVariant> = audio_bitrates
                .iter()
                .enumerate()
                .map(|(i, abr)| audio(video.len() + i, *abr))
                .collect();
            let selection = select_representative(&CatalogPartition { video, audio });
            prop_assert!(matches!(
                selection.last(),
                Some(SelectedEncoding::Audio(_))
            ));
        }
    }
}
