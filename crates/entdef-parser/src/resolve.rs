//! Inheritance resolution over parsed class records.
//!
//! Resolution runs in three steps:
//!
//! 1. Redundant declarations of the same `(kind, name)` are dropped, keeping
//!    the one with the highest line number.
//! 2. Every point and brush class merges its superclasses depth-first, in
//!    declared order. Within one class a base reached twice (a diamond) only
//!    contributes through the first path that reaches it.
//! 3. Base classes are dropped from the output. The surviving classes carry
//!    no superclass names, so resolving them again changes nothing.
//!
//! Merging keeps declared scalars, takes missing ones from the first base
//! that sets them, appends model definitions into one fallback chain, and
//! appends inherited attributes whose names are not declared yet. Flags
//! attributes of the same name are merged bit by bit.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use indexmap::IndexMap;
use log::debug;

use entdef_core::identifier::Id;

use crate::{
    class_info::{ClassInfo, ClassKind},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

/// Resolves inheritance and returns the point and brush classes.
///
/// Never fails; redundant declarations, unknown superclasses and cycles are
/// reported as warnings.
pub fn resolve_inheritance(
    classes: Vec<ClassInfo>,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<ClassInfo> {
    let classes = filter_redundant(classes, diagnostics);

    let mut resolver = Resolver {
        bases: classes
            .iter()
            .filter(|class| class.kind == ClassKind::Base)
            .map(|class| (class.name, class))
            .collect(),
        reported: HashSet::new(),
    };

    let resolved: Vec<ClassInfo> = classes
        .iter()
        .filter(|class| class.kind != ClassKind::Base)
        .map(|class| resolver.resolve(class, diagnostics))
        .collect();

    debug!(
        bases = resolver.bases.len(),
        classes = resolved.len();
        "Resolved class inheritance"
    );
    resolved
}

/// Keep the highest-line record per `(kind, name)`, ties going to the later one
fn filter_redundant(
    classes: Vec<ClassInfo>,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<ClassInfo> {
    let mut kept: HashMap<(ClassKind, Id), usize> = HashMap::new();
    for (index, class) in classes.iter().enumerate() {
        match kept.entry((class.kind, class.name)) {
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
            Entry::Occupied(mut entry) => {
                if class.line() >= classes[*entry.get()].line() {
                    entry.insert(index);
                }
            }
        }
    }

    let is_kept =
        |index: usize, class: &ClassInfo| kept.get(&(class.kind, class.name)) == Some(&index);

    for (index, class) in classes.iter().enumerate() {
        if is_kept(index, class) {
            continue;
        }
        let winner = &classes[kept[&(class.kind, class.name)]];
        diagnostics.emit(
            Diagnostic::warning(format!(
                "redundant {} class `{}` is ignored, the declaration at {} is used",
                class.kind, class.name, winner.location
            ))
            .with_code(ErrorCode::E205)
            .with_location(class.location)
            .with_file(class.file()),
        );
    }

    classes
        .into_iter()
        .enumerate()
        .filter(|(index, class)| is_kept(*index, class))
        .map(|(_, class)| class)
        .collect()
}

struct Resolver<'a> {
    bases: IndexMap<Id, &'a ClassInfo>,
    /// `(class, superclass)` pairs already warned about.
    reported: HashSet<(Id, Id)>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, class: &ClassInfo, diagnostics: &mut DiagnosticCollector) -> ClassInfo {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        let mut resolved = self.resolve_with(class, &mut visited, &mut path, diagnostics);
        // Everything inherited is merged in now.
        resolved.superclass_names.clear();
        resolved
    }

    fn resolve_with(
        &mut self,
        class: &ClassInfo,
        visited: &mut HashSet<Id>,
        path: &mut Vec<Id>,
        diagnostics: &mut DiagnosticCollector,
    ) -> ClassInfo {
        let mut resolved = class.clone();
        path.push(class.name);

        for &superclass in &class.superclass_names {
            if path.contains(&superclass) {
                self.report(
                    class,
                    superclass,
                    ErrorCode::E207,
                    format!("cyclic inheritance: class `{}` inherits `{superclass}` which is already being resolved", class.name),
                    diagnostics,
                );
                continue;
            }
            if !visited.insert(superclass) {
                debug!(class = class.name.to_string(), superclass = superclass.to_string(); "Skipping base already merged");
                continue;
            }
            let Some(&base) = self.bases.get(&superclass) else {
                self.report(
                    class,
                    superclass,
                    ErrorCode::E206,
                    format!("unknown superclass `{superclass}` of class `{}`", class.name),
                    diagnostics,
                );
                continue;
            };

            let base = self.resolve_with(base, visited, path, diagnostics);
            merge(&mut resolved, &base);
        }

        path.pop();
        resolved
    }

    /// Warn once per `(class, superclass)` pair
    fn report(
        &mut self,
        class: &ClassInfo,
        superclass: Id,
        code: ErrorCode,
        message: String,
        diagnostics: &mut DiagnosticCollector,
    ) {
        if self.reported.insert((class.name, superclass)) {
            diagnostics.emit(
                Diagnostic::warning(message)
                    .with_code(code)
                    .with_location(class.location)
                    .with_file(class.file()),
            );
        }
    }
}

/// Merge an already resolved base into `class`
fn merge(class: &mut ClassInfo, base: &ClassInfo) {
    if class.description.is_none() {
        class.description = base.description.clone();
    }
    class.color = class.color.or(base.color);
    class.size = class.size.or(base.size);

    match (&mut class.model_definition, &base.model_definition) {
        (Some(own), Some(inherited)) => own.append(inherited),
        (None, Some(inherited)) => class.model_definition = Some(inherited.clone()),
        (_, None) => {}
    }

    for attribute in &base.attributes {
        match class.attribute_mut(attribute.name()) {
            Some(own) => {
                own.merge_flags(attribute);
            }
            None => class.attributes.push(attribute.clone()),
        }
    }
}
