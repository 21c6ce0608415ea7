use std::sync::Arc;

use tracing::debug;

use super::binding::GlobBinding;
use super::pattern::{GlobPattern, GlobShape, GlobToken, ShapeToken};
use crate::runtime::jit::backend::ClosureArtifact;
use crate::runtime::jit::config::SpecializerConfig;
use crate::runtime::jit::error::SpecializationResult;
use crate::runtime::jit::specialization::{CodeGenerator, SpecializationId, Specializer};

/// Entry point of every compiled glob matcher: `(request pattern, subject)`.
///
/// Exact matchers ignore the pattern argument; shape matchers read its
/// literal characters; the generic matcher interprets it.
pub type GlobEntry = Arc<dyn Fn(&GlobPattern, &str) -> bool + Send + Sync>;
pub type GlobArtifact = ClosureArtifact<GlobEntry>;

/// `(runtime literals, remaining subject) -> matched`
type Step = Box<dyn Fn(&[char], &[char]) -> bool + Send + Sync>;

/// Compiles glob bindings into chains of closures, one step per token.
#[derive(Debug, Default)]
pub struct GlobCompiler {
    compiled: u64,
}

impl GlobCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matchers produced so far
    pub fn compiled(&self) -> u64 {
        self.compiled
    }

    pub fn compile(&mut self, binding: &GlobBinding) -> GlobArtifact {
        let module = self.compiled;
        self.compiled += 1;

        let (name, entry) = match binding {
            GlobBinding::Exact(pattern) => {
                let step = compile_exact(pattern);
                let entry: GlobEntry = Arc::new(move |_: &GlobPattern, subject: &str| {
                    let subject: Vec<char> = subject.chars().collect();
                    step(&[], &subject)
                });
                (format!("glob_exact_{module}"), entry)
            }
            GlobBinding::Shape(shape) => {
                let step = compile_shape(shape);
                let entry: GlobEntry = Arc::new(move |pattern: &GlobPattern, subject: &str| {
                    let literals: Vec<char> = pattern.literals().collect();
                    let subject: Vec<char> = subject.chars().collect();
                    step(&literals, &subject)
                });
                (format!("glob_shape_{module}"), entry)
            }
            GlobBinding::Generic => {
                let entry: GlobEntry = Arc::new(|pattern: &GlobPattern, subject: &str| {
                    pattern.matches_generic(subject)
                });
                (format!("glob_generic_{module}"), entry)
            }
        };
        debug!(%name, ?binding, "compiled glob matcher");
        ClosureArtifact::new(name, entry)
    }
}

impl CodeGenerator<GlobBinding> for GlobCompiler {
    type Artifact = GlobArtifact;

    fn generate(&mut self, binding: &GlobBinding) -> anyhow::Result<GlobArtifact> {
        Ok(self.compile(binding))
    }
}

fn accept_end() -> Step {
    Box::new(|_: &[char], subject: &[char]| subject.is_empty())
}

fn any_char(next: Step) -> Step {
    Box::new(move |literals: &[char], subject: &[char]| {
        subject
            .split_first()
            .is_some_and(|(_, tail)| next(literals, tail))
    })
}

fn any_run(next: Step, trailing: bool) -> Step {
    if trailing {
        return Box::new(|_: &[char], _: &[char]| true);
    }
    Box::new(move |literals: &[char], subject: &[char]| {
        (0..=subject.len()).any(|skip| next(literals, &subject[skip..]))
    })
}

fn literal_run(run: Vec<char>, next: Step) -> Step {
    Box::new(move |literals: &[char], subject: &[char]| {
        subject.starts_with(&run) && next(literals, &subject[run.len()..])
    })
}

fn runtime_literal(index: usize, next: Step) -> Step {
    Box::new(move |literals: &[char], subject: &[char]| {
        match (subject.split_first(), literals.get(index)) {
            (Some((ch, tail)), Some(expected)) if ch == expected => next(literals, tail),
            _ => false,
        }
    })
}

/// Pending literals are collected back to front.
fn flush_literals(pending: &mut Vec<char>, next: Step) -> Step {
    if pending.is_empty() {
        return next;
    }
    let mut run = std::mem::take(pending);
    run.reverse();
    literal_run(run, next)
}

fn compile_exact(pattern: &GlobPattern) -> Step {
    let mut step = accept_end();
    let mut at_end = true;
    let mut pending = Vec::new();
    for token in pattern.tokens().iter().rev() {
        match *token {
            GlobToken::Literal(ch) => pending.push(ch),
            GlobToken::AnyChar => {
                step = any_char(flush_literals(&mut pending, step));
                at_end = false;
            }
            GlobToken::AnyRun => {
                let trailing = at_end && pending.is_empty();
                step = any_run(flush_literals(&mut pending, step), trailing);
                at_end = false;
            }
        }
    }
    flush_literals(&mut pending, step)
}

fn compile_shape(shape: &GlobShape) -> Step {
    let mut index = shape.tokens().len() - shape.wildcard_count();
    let mut step = accept_end();
    let mut at_end = true;
    for token in shape.tokens().iter().rev() {
        step = match token {
            ShapeToken::Literal => {
                index -= 1;
                runtime_literal(index, step)
            }
            ShapeToken::AnyChar => any_char(step),
            ShapeToken::AnyRun => any_run(step, at_end),
        };
        at_end = false;
    }
    step
}

/// Cache of compiled glob matchers keyed by pattern
pub struct GlobMatcherCache {
    specializer: Specializer<GlobCompiler, GlobBinding>,
}

impl GlobMatcherCache {
    pub fn new() -> Self {
        Self::with_config(SpecializerConfig::default())
    }

    pub fn with_config(config: SpecializerConfig) -> Self {
        Self {
            specializer: Specializer::with_config(GlobCompiler::new(), config),
        }
    }

    /// Store the generic backtracking matcher as a catch-all
    pub fn seed_generic(&mut self) -> SpecializationId {
        self.seed(GlobBinding::Generic)
    }

    /// Store a matcher for the wildcard structure of `pattern`
    pub fn seed_shape(&mut self, pattern: &str) -> SpecializationId {
        self.seed(GlobBinding::Shape(GlobPattern::new(pattern).shape()))
    }

    fn seed(&mut self, binding: GlobBinding) -> SpecializationId {
        let artifact = self.specializer.generator_mut().compile(&binding);
        self.specializer.seed(artifact, binding)
    }

    /// Match `subject` against `pattern`, compiling a matcher on a miss.
    pub fn matches(&mut self, pattern: &str, subject: &str) -> SpecializationResult<bool> {
        let pattern = GlobPattern::new(pattern);
        self.specializer
            .call(GlobBinding::Exact(pattern.clone()), (&pattern, subject))
    }

    pub fn specializer(&self) -> &Specializer<GlobCompiler, GlobBinding> {
        &self.specializer
    }

    pub fn specializer_mut(&mut self) -> &mut Specializer<GlobCompiler, GlobBinding> {
        &mut self.specializer
    }
}

impl Default for GlobMatcherCache {
    fn default() -> Self {
        Self::new()
    }
}
