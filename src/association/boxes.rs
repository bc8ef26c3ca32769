use std::collections::BTreeMap;

use log::trace;

use crate::detected_points::Correspondence;
use crate::error::Result;
use crate::types::{Frame, ObjectPairing, first_box_containing};

/// Match counts keyed by current box id, then previous box id.
pub type BoxVotes = BTreeMap<u32, BTreeMap<u32, usize>>;

/// Counts, for every (current, previous) box pair, the matches linking them.
///
/// Each match votes for the first box in stored order containing its keypoint
/// in each frame. Matches outside every box in either frame do not vote.
pub fn count_box_votes(
    matches: &[Correspondence],
    prev_frame: &Frame,
    curr_frame: &Frame,
) -> Result<BoxVotes> {
    let mut votes = BoxVotes::new();
    for m in matches {
        let (prev_kpt, curr_kpt) = m.resolve(&prev_frame.keypoints, &curr_frame.keypoints)?;
        let Some(prev_box) = first_box_containing(&prev_frame.bounding_boxes, prev_kpt.pt) else {
            continue;
        };
        let Some(curr_box) = first_box_containing(&curr_frame.bounding_boxes, curr_kpt.pt) else {
            continue;
        };
        *votes
            .entry(curr_box.id)
            .or_default()
            .entry(prev_box.id)
            .or_default() += 1;
    }
    Ok(votes)
}

/// Pairs each current box with the previous box sharing the most matches.
///
/// Ties go to the lowest previous box id. Current boxes without any vote stay
/// unpaired.
pub fn match_bounding_boxes(
    matches: &[Correspondence],
    prev_frame: &Frame,
    curr_frame: &Frame,
) -> Result<ObjectPairing> {
    let votes = count_box_votes(matches, prev_frame, curr_frame)?;
    let pairing: ObjectPairing = votes
        .iter()
        .filter_map(|(curr_id, candidates)| {
            let mut best: Option<(u32, usize)> = None;
            for (&prev_id, &count) in candidates {
                if best.is_none_or(|(_, best_count)| count > best_count) {
                    best = Some((prev_id, count));
                }
            }
            best.map(|(prev_id, count)| {
                trace!("box {} <- {} with {} votes", curr_id, prev_id, count);
                (*curr_id, prev_id)
            })
        })
        .collect();
    Ok(pairing)
}
