use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use fahrplan_core::{to_local_time_of_day, Route, Timetable};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF generation failed: {0}")]
    Render(#[from] printpdf::Error),
}

const PAGE_WIDTH: f32 = 297.0; // A4 landscape
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;

/// Render a timetable as a Buchfahrplan sheet: title block, one striped
/// row per station (with the covering segment's speed limit and gradient),
/// and a Streckenelemente table below.
pub fn build_timetable_pdf(
    timetable: &Timetable,
    route: &Route,
    tz: Tz,
) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        &timetable.title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Fahrplan",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let mut layer = doc.get_page(page).get_layer(layer);

    set_text_color(&layer);
    layer.use_text(
        format!("Buchfahrplan: {}", timetable.title),
        18.0,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - 18.0),
        &font_bold,
    );
    layer.use_text(
        format!(
            "Zugnummer: {} – Route: {}",
            timetable.train_number, route.name
        ),
        10.0,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - 25.0),
        &font,
    );

    let main_headers = [
        "Kilometer",
        "Ort / Abschnitt",
        "Ank",
        "Abf",
        "Vmax (km/h)",
        "Steigung (\u{2030})",
        "Bemerkung",
    ];
    let main_widths = [22.0, 52.0, 15.0, 15.0, 26.0, 26.0, 62.0];

    let main_rows: Vec<Vec<String>> = timetable
        .entries
        .iter()
        .map(|entry| {
            let station = route.station(&entry.station_id);
            let kilometer = station.map(|st| st.kilometer);
            let segment = route.segment_at(kilometer.unwrap_or(0.0));

            let mut remark_parts = Vec::new();
            if let Some(track) = &entry.track {
                remark_parts.push(format!("Gleis {}", track));
            }
            if let Some(remarks) = &entry.remarks {
                remark_parts.push(remarks.clone());
            } else if let Some(note) = segment.and_then(|seg| seg.note.clone()) {
                remark_parts.push(note);
            }

            vec![
                kilometer.map_or_else(|| "-".to_string(), |km| format!("{:.1} km", km)),
                station.map_or_else(|| entry.station_name.clone(), |st| st.name.clone()),
                format_time(entry.arrival, tz),
                format_time(entry.departure, tz),
                segment.map_or_else(|| "-".to_string(), |seg| seg.speed_limit.to_string()),
                format_gradient(segment.and_then(|seg| seg.gradient)),
                remark_parts.join(" – "),
            ]
        })
        .collect();

    let content_top = PAGE_HEIGHT - 35.0;
    let mut current_y = draw_table(
        &layer,
        &font,
        &font_bold,
        content_top,
        &main_headers,
        &main_rows,
        &main_widths,
    );

    let segment_headers = ["Km von", "Km bis", "Vmax (km/h)", "Steigung (\u{2030})", "Hinweis"];
    let segment_widths = [22.0, 22.0, 26.0, 26.0, 122.0];
    let segment_rows: Vec<Vec<String>> = route
        .segments
        .iter()
        .map(|seg| {
            vec![
                format!("{:.1}", seg.km_start),
                format!("{:.1}", seg.km_end),
                seg.speed_limit.to_string(),
                format_gradient(seg.gradient),
                seg.note.clone().unwrap_or_default(),
            ]
        })
        .collect();

    // break to a fresh page when the segment table would underflow the margin
    if current_y - (segment_rows.len() as f32 + 2.0) * ROW_HEIGHT < MARGIN {
        let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Fahrplan");
        layer = doc.get_page(page).get_layer(new_layer);
        current_y = PAGE_HEIGHT - 20.0;
    }

    set_text_color(&layer);
    layer.use_text(
        "Streckenelemente",
        12.0,
        Mm(MARGIN),
        Mm(current_y - 8.0),
        &font_bold,
    );
    draw_table(
        &layer,
        &font,
        &font_bold,
        current_y - 12.0,
        &segment_headers,
        &segment_rows,
        &segment_widths,
    );

    Ok(doc.save_to_bytes()?)
}

/// Draw a bordered table whose header row sits just below `y_top`;
/// returns the y coordinate below the last row.
fn draw_table(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
    y_top: f32,
    headers: &[&str],
    rows: &[Vec<String>],
    widths: &[f32],
) -> f32 {
    let header_fill = Color::Rgb(Rgb::new(0.85, 0.85, 0.85, None));
    let mut y = y_top - ROW_HEIGHT;
    let mut x = MARGIN;
    for (idx, header) in headers.iter().enumerate() {
        cell(layer, font_bold, x, y, widths[idx], header, &header_fill, 9.0);
        x += widths[idx];
    }

    for (row_idx, row) in rows.iter().enumerate() {
        y -= ROW_HEIGHT;
        let stripe = if row_idx % 2 == 1 {
            Color::Rgb(Rgb::new(0.96, 0.96, 0.96, None))
        } else {
            Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None))
        };
        x = MARGIN;
        for (idx, value) in row.iter().enumerate() {
            cell(layer, font, x, y, widths[idx], value, &stripe, 8.0);
            x += widths[idx];
        }
    }

    y
}

fn cell(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    x: f32,
    y: f32,
    width: f32,
    text: &str,
    fill: &Color,
    font_size: f32,
) {
    let rect = Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + ROW_HEIGHT));
    layer.set_fill_color(fill.clone());
    layer.add_rect(rect.clone().with_mode(PaintMode::Fill));
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.2);
    layer.add_rect(rect.with_mode(PaintMode::Stroke));

    // rough clip so long remarks stay inside their column
    let max_chars = (width / 1.7) as usize;
    let clipped: String = text.chars().take(max_chars).collect();
    set_text_color(layer);
    layer.use_text(clipped, font_size, Mm(x + 1.5), Mm(y + 2.0), font);
}

fn set_text_color(layer: &PdfLayerReference) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

fn format_time(value: Option<DateTime<Utc>>, tz: Tz) -> String {
    value.map_or_else(|| "-".to_string(), |instant| to_local_time_of_day(instant, tz))
}

fn format_gradient(value: Option<i32>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if v > 0 => format!("+{}", v),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::TimeZone;
    use chrono_tz::Europe::Vienna;
    use fahrplan_core::generate_base_timetable;

    #[test]
    fn renders_a_parseable_pdf() {
        let route = &seed::demo_routes()[0];
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
        let timetable = generate_base_timetable(route, "tt-1", start, 2);

        let bytes = build_timetable_pdf(&timetable, route, Vienna).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1_000);
    }

    #[test]
    fn gradient_formatting_keeps_the_sign_convention() {
        assert_eq!(format_gradient(Some(6)), "+6");
        assert_eq!(format_gradient(Some(-4)), "-4");
        assert_eq!(format_gradient(Some(0)), "0");
        assert_eq!(format_gradient(None), "-");
    }
}
