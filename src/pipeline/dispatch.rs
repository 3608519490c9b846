//! Engine dispatch: run the selected engines over every page.
//!
//! Each (page, engine) pair is an independent future. Up to `concurrency`
//! run at once via `buffer_unordered`; results are sorted back into
//! (page, engine slot) order before they are grouped, so completion order
//! never shows in the output.

use crate::engines::{EngineSelection, EngineSet, OcrEngine};
use crate::output::{EngineResult, PageText};
use crate::pipeline::render::PageImage;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text of one page built from its engine results.
///
/// A single result is shown as-is. Several results become labelled blocks
/// (`"<label>:\n<text>"`) separated by a blank line.
pub fn page_block(results: &[EngineResult]) -> String {
    match results {
        [only] => only.text(),
        many => many
            .iter()
            .map(|r| format!("{}:\n{}", r.engine, r.text()))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Run `selection` over `pages` and return one [`PageText`] per page, in
/// ordinal order.
pub async fn dispatch(
    engines: &EngineSet,
    pages: &[PageImage],
    selection: EngineSelection,
    concurrency: usize,
    progress: Option<&ProgressCallback>,
) -> Vec<PageText> {
    let selected = engines.selected(selection);
    let total = pages.len();

    let jobs = pages.iter().flat_map(|page| {
        selected
            .iter()
            .enumerate()
            .map(move |(slot, engine)| (page.clone(), slot, Arc::clone(engine)))
    });

    let mut finished: Vec<(usize, EngineResult)> = stream::iter(jobs.map(
        |(page, slot, engine): (PageImage, usize, Arc<dyn OcrEngine>)| async move {
            let label = engine.label().to_string();
            debug!("Page {}/{} → {}", page.ordinal, total, label);
            let outcome = engine.recognize(&page.path).await;

            if let Some(cb) = progress {
                match &outcome {
                    Ok(text) => cb.on_engine_complete(page.ordinal, total, &label, text.chars().count()),
                    Err(e) => cb.on_engine_error(page.ordinal, total, &label, &e.to_string()),
                }
            }
            if let Err(e) = &outcome {
                warn!("{} failed on page {}: {}", label, page.ordinal, e);
            }

            (
                slot,
                EngineResult {
                    engine: label,
                    ordinal: page.ordinal,
                    outcome,
                },
            )
        },
    ))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    finished.sort_by_key(|(slot, r)| (r.ordinal, *slot));

    let mut grouped: BTreeMap<usize, Vec<EngineResult>> = BTreeMap::new();
    for (_, result) in finished {
        grouped.entry(result.ordinal).or_default().push(result);
    }

    grouped
        .into_iter()
        .map(|(ordinal, results)| PageText {
            ordinal,
            text: page_block(&results),
            results,
        })
        .collect()
}
