use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::models::job::{JobSnapshot, LineStatus};

const PAGE_WIDTH: f32 = 612.0; // US letter, points
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 36.0;
const ROW_HEIGHT: f32 = 18.0;
const ROWS_PER_PAGE: usize = 38;

/// Render a batch as the downloadable CSV report: a metadata row with the
/// completion timestamp, a blank row, then Number/Status rows in
/// first-occurrence order.
pub fn render_csv(snapshot: &JobSnapshot) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let completed = snapshot
        .completed_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    writer.write_record(["Test Completed At", &completed])?;
    writer.write_record([""])?;
    writer.write_record(["Number", "Status"])?;

    for number in snapshot.distinct_numbers() {
        let status = snapshot
            .statuses
            .get(number)
            .copied()
            .unwrap_or(LineStatus::Pending);
        writer.write_record([number, status.label()])?;
    }

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// The sample CSV offered on the upload page.
pub fn sample_csv() -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["number"])?;
    for number in ["+18005551234", "+18001234567", "+18005559876"] {
        writer.write_record([number])?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Render a batch as a PDF table, one row per distinct number, with the
/// status cell colored by bucket (green active, red inactive, amber
/// otherwise). Paginates for large batches.
pub fn render_pdf(snapshot: &JobSnapshot) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let numbers = snapshot.distinct_numbers();
    let mut page_ids: Vec<Object> = Vec::new();

    for (page_index, chunk) in numbers.chunks(ROWS_PER_PAGE).enumerate() {
        let mut ops: Vec<Operation> = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        if page_index == 0 {
            text(&mut ops, MARGIN, y, 16.0, "Line Verification Results");
            y -= 24.0;
        }

        // Header row on a light gray band.
        fill_rect(&mut ops, MARGIN, y - 4.0, PAGE_WIDTH - 2.0 * MARGIN, ROW_HEIGHT, (0.95, 0.95, 0.95));
        text(&mut ops, MARGIN + 4.0, y, 10.0, "Number");
        text(&mut ops, MARGIN + 254.0, y, 10.0, "Status");
        y -= ROW_HEIGHT;

        for number in chunk {
            let status = snapshot
                .statuses
                .get(*number)
                .copied()
                .unwrap_or(LineStatus::Pending);
            let (bg, fg) = status_colors(status);

            fill_rect(&mut ops, MARGIN + 250.0, y - 4.0, 200.0, ROW_HEIGHT, bg);
            text(&mut ops, MARGIN + 4.0, y, 10.0, number);
            colored_text(&mut ops, MARGIN + 254.0, y, 10.0, status.label(), fg);
            y -= ROW_HEIGHT;
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id.into());
    }

    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn status_colors(status: LineStatus) -> ((f32, f32, f32), (f32, f32, f32)) {
    match status {
        LineStatus::Active => ((0.90, 1.0, 0.93), (0.02, 0.35, 0.18)),
        LineStatus::Inactive => ((1.0, 0.93, 0.93), (0.55, 0.12, 0.12)),
        // Pending / in-progress / provider-disabled share the amber bucket.
        _ => ((1.0, 0.97, 0.90), (0.54, 0.29, 0.0)),
    }
}

fn text(ops: &mut Vec<Operation>, x: f32, y: f32, size: f32, s: &str) {
    colored_text(ops, x, y, size, s, (0.13, 0.13, 0.13));
}

fn colored_text(ops: &mut Vec<Operation>, x: f32, y: f32, size: f32, s: &str, color: (f32, f32, f32)) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "rg",
        vec![color.0.into(), color.1.into(), color.2.into()],
    ));
    ops.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(s)]));
    ops.push(Operation::new("ET", vec![]));
}

fn fill_rect(ops: &mut Vec<Operation>, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    ops.push(Operation::new(
        "rg",
        vec![color.0.into(), color.1.into(), color.2.into()],
    ));
    ops.push(Operation::new(
        "re",
        vec![x.into(), y.into(), w.into(), h.into()],
    ));
    ops.push(Operation::new("f", vec![]));
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
