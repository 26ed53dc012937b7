// Caption synthesis: turns inferred metadata into a short Japanese caption
// followed by a fixed set of hashtags.

use crate::meta::{Metadata, Stage};

/// Upper bound on hashtags per caption.
pub const MAX_HASHTAGS: usize = 10;

pub const COMMON_TAGS: [&str; 5] = [
    "#家庭菜園",
    "#菜園記録",
    "#homegrown",
    "#gardening",
    "#kitchengarden",
];

/// Closing clause of the first line.
pub fn stage_line(stage: Stage) -> &'static str {
    match stage {
        Stage::Planting => "今日の一手が実りに変わる。",
        Stage::Germination => "双葉が合図、ここから物語が始まる。",
        Stage::Harvest => "完熟の合図、今が食べどき。",
    }
}

pub fn stage_tags(stage: Stage) -> [&'static str; 3] {
    match stage {
        Stage::Planting => ["#植え付け", "#定植", "#soilprep"],
        Stage::Germination => ["#発芽", "#seedling", "#sprouting"],
        Stage::Harvest => ["#収穫", "#収穫日記", "#freshharvest"],
    }
}

/// Common tags, then stage tags, then the crop tag, capped at
/// [`MAX_HASHTAGS`].
pub fn hashtags(meta: &Metadata) -> Vec<String> {
    COMMON_TAGS
        .iter()
        .chain(stage_tags(meta.stage).iter())
        .map(|tag| tag.to_string())
        .chain(std::iter::once(format!("#{}", meta.crop)))
        .take(MAX_HASHTAGS)
        .collect()
}

/// Build the full caption: one sentence, a newline, then the hashtags.
pub fn synthesize(meta: &Metadata) -> String {
    format!(
        "{}の畑より。{}の{}、{}\n{}",
        meta.location,
        meta.season,
        meta.crop,
        stage_line(meta.stage),
        hashtags(meta).join(" ")
    )
}
