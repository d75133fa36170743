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
/*
 * The leaderboard image is composed as an SVG string and rasterized with
 * resvg; avatars arrive as raw PNG bytes and are embedded as base64 data URIs
 * under a circular clip. Rasterization is CPU-bound, so callers run
 * `render_leaderboard` inside `spawn_blocking`.
 */
use base64::{engine::general_purpose::STANDARD as base64_engine, Engine as _};
use resvg::usvg::{self, fontdb, Options as UsvgOptions};
use resvg::{
    render,
    tiny_skia::{Pixmap, Transform},
};
use std::fmt::Write;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/* Fixed layout, in pixels: */

pub const WIDTH: u32 = 700;
/// Height of one table row.
pub const ROW_HEIGHT: u32 = 40;
/// Header plus top-3 podium area above the table.
pub const TOP_AREA: u32 = 300;
/// Column-label header of the table.
pub const LIST_HEADER: u32 = 60;
pub const BOTTOM_PAD: u32 = 60;
pub const MIN_HEIGHT: u32 = 700;

const FONT_STACK: &str = "'Segoe UI', Arial, Helvetica, sans-serif";
const PODIUM_AVATAR_RADIUS: u32 = 44;
const ROW_AVATAR_RADIUS: u32 = 12;

/// Podium slots left to right: silver (rank 2), gold (rank 1), bronze
/// (rank 3). The last field indexes into the sorted top-3 list.
const PODIUM_SLOTS: [(&str, &str, i64, usize); 3] = [
    ("SILVER", "#c0c0c0", -180, 1),
    ("GOLD", "#ffd700", 0, 0),
    ("BRONZE", "#cd7f32", 180, 2),
];

/**
 * One fully resolved leaderboard entry, ready to draw: global 1-based rank,
 * display name, points, and the avatar as PNG bytes when the fetch succeeded.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct CanvasEntry {
    pub rank: usize,
    pub name: String,
    pub points: i64,
    pub avatar_png: Option<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG formatting error: {0}")]
    Svg(#[from] std::fmt::Error),
    #[error("could not parse the generated SVG: {0}")]
    SvgParse(String),
    #[error("could not allocate the output pixmap")]
    Pixmap,
    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] png::EncodingError),
}

/**
 * Canvas height for a page with `row_count` table rows. The count is the
 * number of rows actually present on the page, not the page capacity.
 */
pub fn canvas_height(row_count: usize) -> u32 {
    (TOP_AREA + LIST_HEADER + row_count as u32 * ROW_HEIGHT + BOTTOM_PAD).max(MIN_HEIGHT)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Circular-clipped avatar image, or a translucent placeholder disc, plus the
/// white ring every avatar wears.
fn write_avatar(
    svg: &mut String,
    clip_id: &str,
    cx: i64,
    cy: i64,
    radius: u32,
    avatar_png: Option<&[u8]>,
    ring_width: u32,
) -> Result<(), RenderError> {
    match avatar_png {
        Some(bytes) => {
            let href = format!("data:image/png;base64,{}", base64_engine.encode(bytes));
            writeln!(
                svg,
                r##"<defs><clipPath id="{clip_id}"><circle cx="{cx}" cy="{cy}" r="{radius}" /></clipPath></defs>"##
            )?;
            writeln!(
                svg,
                r##"<image href="{href}" x="{}" y="{}" width="{}" height="{}" clip-path="url(#{clip_id})" />"##,
                cx - radius as i64,
                cy - radius as i64,
                radius * 2,
                radius * 2
            )?;
        }
        None => {
            writeln!(
                svg,
                r##"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="#ffffff" fill-opacity="0.25" />"##
            )?;
        }
    }
    writeln!(
        svg,
        r##"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="none" stroke="#ffffff" stroke-opacity="0.9" stroke-width="{ring_width}" />"##
    )?;
    Ok(())
}

fn write_podium(svg: &mut String, top3: &[CanvasEntry]) -> Result<(), RenderError> {
    let top_y: i64 = 40;

    for (label, color, offset, idx) in PODIUM_SLOTS {
        // Fewer than three ranked users: the slot stays empty, the others do
        // not shift.
        let Some(entry) = top3.get(idx) else {
            continue;
        };
        let cx = WIDTH as i64 / 2 + offset;

        writeln!(
            svg,
            r##"<text x="{cx}" y="{top_y}" text-anchor="middle" font-family="{FONT_STACK}" font-size="22" font-weight="900" fill="{color}">{label}</text>"##
        )?;

        let cy = top_y + 38 + PODIUM_AVATAR_RADIUS as i64;
        write_avatar(
            svg,
            &format!("podium-clip-{idx}"),
            cx,
            cy,
            PODIUM_AVATAR_RADIUS,
            entry.avatar_png.as_deref(),
            6,
        )?;

        let name_y = cy + PODIUM_AVATAR_RADIUS as i64 + 26;
        writeln!(
            svg,
            r##"<text x="{cx}" y="{name_y}" text-anchor="middle" font-family="{FONT_STACK}" font-size="16" font-weight="600" fill="#ffffff">{}</text>"##,
            escape_xml(&entry.name)
        )?;
        writeln!(
            svg,
            r##"<text x="{cx}" y="{}" text-anchor="middle" font-family="{FONT_STACK}" font-size="16" font-weight="800" fill="#ffffff">{} pts</text>"##,
            name_y + 22,
            entry.points
        )?;
    }
    Ok(())
}

fn write_table(svg: &mut String, rows: &[CanvasEntry]) -> Result<(), RenderError> {
    let list_x: i64 = 40;
    let list_y = TOP_AREA as i64;
    let list_w = WIDTH as i64 - list_x * 2;
    let list_h = LIST_HEADER as i64 + rows.len() as i64 * ROW_HEIGHT as i64;

    // Card and header band:
    writeln!(
        svg,
        r##"<rect x="{list_x}" y="{list_y}" width="{list_w}" height="{list_h}" rx="18" fill="#000000" fill-opacity="0.35" />"##
    )?;
    writeln!(
        svg,
        r##"<rect x="{list_x}" y="{list_y}" width="{list_w}" height="{LIST_HEADER}" rx="18" fill="#ffffff" fill-opacity="0.10" />"##
    )?;

    // Column labels:
    let header_baseline = list_y + 38;
    writeln!(
        svg,
        r##"<text x="{}" y="{header_baseline}" font-family="{FONT_STACK}" font-size="15" font-weight="700" fill="#dbeafe">RANK</text>"##,
        list_x + 18
    )?;
    writeln!(
        svg,
        r##"<text x="{}" y="{header_baseline}" font-family="{FONT_STACK}" font-size="15" font-weight="700" fill="#dbeafe">NAME</text>"##,
        list_x + 88
    )?;
    writeln!(
        svg,
        r##"<text x="{}" y="{header_baseline}" text-anchor="end" font-family="{FONT_STACK}" font-size="15" font-weight="700" fill="#dbeafe">SCORE</text>"##,
        list_x + list_w - 18
    )?;

    for (i, entry) in rows.iter().enumerate() {
        let y = list_y + LIST_HEADER as i64 + i as i64 * ROW_HEIGHT as i64;

        // Subtle row guide:
        writeln!(
            svg,
            r##"<rect x="{}" y="{}" width="{}" height="14" rx="8" fill="#ffffff" fill-opacity="0.06" />"##,
            list_x + 18,
            y + 10,
            list_w - 36
        )?;

        writeln!(
            svg,
            r##"<text x="{}" y="{}" font-family="{FONT_STACK}" font-size="16" font-weight="700" fill="#e2e8f0">{}</text>"##,
            list_x + 18,
            y + 26,
            entry.rank
        )?;

        write_avatar(
            svg,
            &format!("row-clip-{i}"),
            list_x + 48,
            y + ROW_HEIGHT as i64 / 2,
            ROW_AVATAR_RADIUS,
            entry.avatar_png.as_deref(),
            3,
        )?;

        writeln!(
            svg,
            r##"<text x="{}" y="{}" font-family="{FONT_STACK}" font-size="16" font-weight="600" fill="#ffffff">{}</text>"##,
            list_x + 70,
            y + 26,
            escape_xml(&entry.name)
        )?;
        writeln!(
            svg,
            r##"<text x="{}" y="{}" text-anchor="end" font-family="{FONT_STACK}" font-size="16" font-weight="800" fill="#ffffff">{}</text>"##,
            list_x + list_w - 18,
            y + 26,
            entry.points
        )?;
    }
    Ok(())
}

/**
 * Composes the full leaderboard SVG: gradient background, top-3 podium and the
 * paginated row table. `top3` is the global top of the sorted view (gold
 * first); `rows` is the slice for the requested page with global ranks.
 */
pub fn leaderboard_svg(top3: &[CanvasEntry], rows: &[CanvasEntry]) -> Result<String, RenderError> {
    let height = canvas_height(rows.len());
    let mut svg = String::with_capacity(16 * 1024);

    writeln!(
        svg,
        r##"<svg width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"##
    )?;
    writeln!(
        svg,
        r##"<defs><linearGradient id="bg" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="#b380e2" /><stop offset="100%" stop-color="#e4a4e4" /></linearGradient></defs>"##
    )?;
    writeln!(svg, r##"<rect width="100%" height="100%" fill="url(#bg)" />"##)?;

    write_podium(&mut svg, top3)?;
    write_table(&mut svg, rows)?;

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

// Loading system fonts is slow; do it once per process.
static FONT_DB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn global_font_db() -> Arc<fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/**
 * Rasterizes an SVG document into an in-memory PNG buffer.
 */
pub fn rasterize(svg: &str) -> Result<Vec<u8>, RenderError> {
    let opts = UsvgOptions {
        fontdb: global_font_db(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
        .map_err(|e| RenderError::SvgParse(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or(RenderError::Pixmap)?;
    render(&tree, Transform::default(), &mut pixmap.as_mut());

    let mut out = Vec::with_capacity((size.width() * size.height() * 4) as usize);
    {
        let mut encoder = png::Encoder::new(&mut out, size.width(), size.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixmap.data())?;
        writer.finish()?;
    }
    Ok(out)
}

/**
 * The whole image pipeline: compose the SVG and rasterize it to PNG bytes.
 * Nothing is written to disk; the caller decides whether to upload the buffer.
 */
pub fn render_leaderboard(top3: &[CanvasEntry], rows: &[CanvasEntry]) -> Result<Vec<u8>, RenderError> {
    rasterize(&leaderboard_svg(top3, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: usize, name: &str, points: i64) -> CanvasEntry {
        CanvasEntry {
            rank,
            name: name.to_string(),
            points,
            avatar_png: None,
        }
    }

    fn entries(n: usize) -> Vec<CanvasEntry> {
        (1..=n).map(|r| entry(r, &format!("user{r}"), 100 - r as i64)).collect()
    }

    #[test]
    fn height_follows_the_actual_row_count_not_the_page_capacity() {
        // 5 rows on a 10-per-page request: the canvas sizes for 5.
        assert_eq!(canvas_height(5), MIN_HEIGHT);
        assert_eq!(canvas_height(10), TOP_AREA + LIST_HEADER + 10 * ROW_HEIGHT + BOTTOM_PAD);
        assert_ne!(canvas_height(5), canvas_height(10));
    }

    #[test]
    fn svg_document_carries_the_computed_height() {
        let rows = entries(5);
        let svg = leaderboard_svg(&rows[..3.min(rows.len())], &rows).unwrap();
        assert!(svg.contains(&format!(r##"height="{}""##, canvas_height(5))));

        let rows = entries(12);
        let svg = leaderboard_svg(&rows[..3], &rows).unwrap();
        assert!(svg.contains(&format!(r##"height="{}""##, canvas_height(12))));
    }

    #[test]
    fn missing_podium_ranks_skip_their_slot_without_shifting_the_others() {
        let top = entries(2); // no bronze
        let svg = leaderboard_svg(&top, &top).unwrap();
        assert!(svg.contains(">GOLD<"));
        assert!(svg.contains(">SILVER<"));
        assert!(!svg.contains(">BRONZE<"));
        // Gold stays centered on the canvas midline.
        assert!(svg.contains(&format!(r##"x="{}" y="40""##, WIDTH / 2)));
    }

    #[test]
    fn table_draws_one_row_per_entry_with_global_ranks() {
        let all = entries(15);
        // Page 2 of 10-per-page: ranks 11..=15.
        let svg = leaderboard_svg(&all[..3], &all[10..]).unwrap();
        assert!(svg.contains(">11<"));
        assert!(svg.contains(">15<"));
        assert!(svg.contains("user15"));
        assert!(!svg.contains(">user5<"));
    }

    #[test]
    fn names_are_xml_escaped() {
        let rows = vec![entry(1, "a<b&c", 1)];
        let svg = leaderboard_svg(&rows, &rows).unwrap();
        assert!(svg.contains("a&lt;b&amp;c"));
        assert!(!svg.contains("a<b&c"));
    }

    #[test]
    fn placeholder_discs_are_drawn_when_avatars_are_missing() {
        let rows = entries(1);
        let svg = leaderboard_svg(&rows, &rows).unwrap();
        assert!(svg.contains(r##"fill-opacity="0.25""##));
        assert!(!svg.contains("data:image/png;base64"));
    }

    #[test]
    fn hex_colors_survive_into_the_document() {
        let rows = entries(3);
        let svg = leaderboard_svg(&rows, &rows).unwrap();
        assert!(svg.contains(r##"fill="#ffd700""##));
        assert!(svg.contains(r##"stop-color="#b380e2""##));
        assert!(svg.contains(r##"fill="url(#bg)""##));
    }

    #[test]
    fn rendering_yields_a_png_buffer() {
        let rows = entries(3);
        let png = render_leaderboard(&rows, &rows).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
