//! Search script selection.
//!
//! Folder and date narrowing always run before a body predicate; body
//! matching reads every candidate note's HTML.

use super::{Literal, ScriptBuilder, ScriptWriter};
use crate::types::{SearchOptions, SearchScope};

/// Shape of the generated search script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Built-in `notes where name contains` query.
    TitleIndex,
    /// Narrow by folder and date, then test titles.
    TitleFiltered,
    /// Walk every note testing the body (and title for `both`).
    BodyScan,
    /// Narrow by folder and date, then test bodies.
    BodyFiltered,
}

impl SearchStrategy {
    pub fn select(scope: SearchScope, filtered: bool) -> Self {
        match (scope.reads_body(), filtered) {
            (false, false) => SearchStrategy::TitleIndex,
            (false, true) => SearchStrategy::TitleFiltered,
            (true, false) => SearchStrategy::BodyScan,
            (true, true) => SearchStrategy::BodyFiltered,
        }
    }

    pub fn for_options(opts: &SearchOptions) -> Self {
        Self::select(opts.scope, opts.has_filters())
    }
}

impl ScriptBuilder {
    /// Fast title search.
    pub fn search_titles(&self, query: &str) -> String {
        let query = Literal::text(query);
        self.in_account(|w| {
            w.line("set matchedNotes to {}")
                .line(format!("set foundNotes to notes where name contains {query}"));
            w.each("n", "foundNotes", |w| {
                w.line("set end of matchedNotes to name of n");
            });
            w.return_joined("matchedNotes");
        })
    }

    /// Script for `opts` and the strategy it was built with.
    pub fn search(&self, opts: &SearchOptions) -> (SearchStrategy, String) {
        let strategy = SearchStrategy::for_options(opts);
        let script = match strategy {
            SearchStrategy::TitleIndex => self.search_titles(&opts.query),
            SearchStrategy::BodyScan => self.in_account(|w| {
                w.line("set matchedNotes to {}");
                w.each("n", "notes", |w| {
                    collect_if_matches(w, opts.scope, &opts.query);
                });
                w.return_joined("matchedNotes");
            }),
            SearchStrategy::TitleFiltered | SearchStrategy::BodyFiltered => {
                self.in_account(|w| write_filtered(w, opts))
            }
        };
        (strategy, script)
    }
}

fn write_filtered(w: &mut ScriptWriter, opts: &SearchOptions) {
    w.line("set matchedNotes to {}");
    match opts.folder_filter() {
        Some(folder) => {
            w.line(format!("set targetFolder to folder {}", Literal::text(folder)))
                .line("set candidateNotes to notes of targetFolder");
        }
        None => {
            w.line("set candidateNotes to notes");
        }
    }
    if let Some(from) = opts.date_from {
        w.line(format!("set dateFrom to {}", Literal::date(from)));
    }
    if let Some(to) = opts.date_to {
        w.line(format!("set dateTo to {}", Literal::date(to)));
    }

    let mut bounds = Vec::new();
    if opts.date_from.is_some() {
        bounds.push("(noteDate >= dateFrom)");
    }
    if opts.date_to.is_some() {
        bounds.push("(noteDate <= dateTo)");
    }

    w.each("n", "candidateNotes", |w| {
        if bounds.is_empty() {
            collect_if_matches(w, opts.scope, &opts.query);
        } else {
            w.line("set noteDate to modification date of n");
            w.when(bounds.join(" and "), |w| {
                collect_if_matches(w, opts.scope, &opts.query);
            });
        }
    });
    w.return_joined("matchedNotes");
}

fn collect_if_matches(w: &mut ScriptWriter, scope: SearchScope, query: &str) {
    let query = Literal::text(query);
    let condition = match scope {
        SearchScope::Title => format!("name of n contains {query}"),
        SearchScope::Body => format!("body of n contains {query}"),
        SearchScope::Both => format!("(name of n contains {query}) or (body of n contains {query})"),
    };
    w.when(condition, |w| {
        w.line("set end of matchedNotes to name of n");
    });
}
