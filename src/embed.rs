/*
 *  Podio - Discord bot maintaining a point-based ranking for a guild.
 *  Copyright (C) 2025  Podio contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::ranking;
use poise::serenity_prelude::{Colour, CreateEmbed, CreateEmbedFooter, Timestamp};

/// Discord's hard cap on an embed description.
pub const DESCRIPTION_LIMIT: usize = 4096;

const TRUNCATION_MARKER: &str = "… *(list truncated)*";
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
const EMBED_COLOR: u32 = 0x5865F2;

/**
 * One leaderboard row ready for display: global 1-based rank, user mention and
 * point total. The caller has already sliced the sorted view to the page.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct DisplayRow {
    pub rank: usize,
    pub mention: String,
    pub points: i64,
}

/**
 * Caller-supplied presentation overrides of the `ranking` command.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Default)]
pub struct EmbedOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

/// Medal glyph for the global top 3, if any.
pub fn medal(rank: usize) -> Option<&'static str> {
    MEDALS.get(rank.checked_sub(1)?).copied()
}

fn format_row(row: &DisplayRow) -> String {
    match medal(row.rank) {
        Some(glyph) => format!("**{}.** {} {glyph} — **{}** pts", row.rank, row.mention, row.points),
        None => format!("**{}.** {} — **{}** pts", row.rank, row.mention, row.points),
    }
}

/**
 * Joins the rows (below an optional extra description) into the embed text,
 * never exceeding `DESCRIPTION_LIMIT` characters: trailing rows are dropped
 * and a truncation marker appended until the text fits.
 */
pub fn build_description(extra: Option<&str>, rows: &[DisplayRow]) -> String {
    let prefix = extra.map(|d| format!("{d}\n\n")).unwrap_or_default();
    let mut lines: Vec<String> = rows.iter().map(format_row).collect();
    let mut truncated = false;

    loop {
        let mut body = lines.join("\n");
        if truncated {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(TRUNCATION_MARKER);
        }
        let text = format!("{prefix}{body}");
        if text.chars().count() <= DESCRIPTION_LIMIT {
            return text;
        }
        if lines.is_empty() {
            // The extra description alone exceeds the limit: cut it too.
            let keep = DESCRIPTION_LIMIT - TRUNCATION_MARKER.chars().count();
            let mut cut: String = prefix.chars().take(keep).collect();
            cut.push_str(TRUNCATION_MARKER);
            return cut;
        }
        lines.pop();
        truncated = true;
    }
}

/**
 * Builds the leaderboard embed for one page of pre-resolved rows.
 *
 * The default thumbnail is the global rank-1 user's avatar (not the top of the
 * current page); an explicit thumbnail override wins over it.
 */
pub fn leaderboard_embed(
    rows: &[DisplayRow],
    total: usize,
    page: usize,
    per_page: usize,
    overrides: &EmbedOverrides,
    default_thumbnail: Option<String>,
    default_title: &str,
) -> CreateEmbed {
    let title = overrides
        .title
        .clone()
        .unwrap_or_else(|| default_title.to_string());
    let mut embed = CreateEmbed::new()
        .colour(Colour::new(EMBED_COLOR))
        .title(title)
        .description(build_description(overrides.description.as_deref(), rows))
        .footer(CreateEmbedFooter::new(format!(
            "Page {page}/{} • Total: {total}",
            ranking::page_count(total, per_page)
        )))
        .timestamp(Timestamp::now());

    if let Some(thumbnail) = overrides.thumbnail.clone().or(default_thumbnail) {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(image) = &overrides.image {
        embed = embed.image(image.clone());
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rank: usize, points: i64) -> DisplayRow {
        DisplayRow {
            rank,
            mention: format!("<@10000000000000{rank:04}>"),
            points,
        }
    }

    #[test]
    fn only_the_global_top_three_get_medals() {
        assert_eq!(medal(1), Some("🥇"));
        assert_eq!(medal(2), Some("🥈"));
        assert_eq!(medal(3), Some("🥉"));
        assert_eq!(medal(4), None);
        assert_eq!(medal(0), None);
    }

    #[test]
    fn rows_carry_rank_mention_and_points() {
        let text = build_description(None, &[row(4, 120)]);
        assert!(text.contains("**4.**"));
        assert!(text.contains("<@100000000000000004>"));
        assert!(text.contains("**120** pts"));
        assert!(!text.contains("🥇"));
    }

    #[test]
    fn medals_are_rendered_for_top_ranks() {
        let text = build_description(None, &[row(1, 50), row(2, 40)]);
        assert!(text.contains("🥇"));
        assert!(text.contains("🥈"));
    }

    #[test]
    fn extra_description_is_prepended() {
        let text = build_description(Some("Season 3 standings"), &[row(1, 50)]);
        assert!(text.starts_with("Season 3 standings\n\n"));
    }

    #[test]
    fn short_lists_are_not_truncated() {
        let rows: Vec<DisplayRow> = (1..=10).map(|r| row(r, 100 - r as i64)).collect();
        let text = build_description(None, &rows);
        assert!(!text.contains(TRUNCATION_MARKER));
        assert_eq!(text.lines().count(), 10);
    }

    #[test]
    fn oversized_extra_description_is_cut_to_the_discord_limit() {
        let prefix = "x".repeat(5000);
        let text = build_description(Some(&prefix), &[row(1, 10)]);
        assert!(text.chars().count() <= DESCRIPTION_LIMIT);
        assert!(text.ends_with(TRUNCATION_MARKER));

        // Same with no rows at all:
        let text = build_description(Some(&prefix), &[]);
        assert!(text.chars().count() <= DESCRIPTION_LIMIT);
    }

    #[test]
    fn overlong_lists_are_cut_to_the_discord_limit() {
        let rows: Vec<DisplayRow> = (1..=500).map(|r| row(r, r as i64)).collect();
        let text = build_description(Some("A rather verbose preamble"), &rows);
        assert!(text.chars().count() <= DESCRIPTION_LIMIT);
        assert!(text.contains(TRUNCATION_MARKER));
        // Earlier rows survive; the cut happens at the tail.
        assert!(text.contains("**1.**"));
        assert!(!text.contains("**500.**"));
    }
}
