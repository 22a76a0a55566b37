//! Policy-parameterized minification.
//!
//! A generic size-reduction pass over the linked bundle, driven entirely by
//! the profile's [`MinifyPolicy`]: mangling depth, comment retention, and
//! the reserved-symbol set (enforced afterwards by the validate stage).
//! Deterministic by construction: same bundle and policy, same bytes.
//!
//! [`MinifyPolicy`]: duplex_profile::MinifyPolicy

use std::path::PathBuf;
use std::sync::OnceLock;

use duplex_profile::{CommentPolicy, MinifyPolicy};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions, LegalComment};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

use crate::{Error, Result};

/// Minified bundle plus its source map.
pub struct MinifyOutcome {
    pub code: String,
    pub map: Option<oxc_sourcemap::SourceMap>,
}

/// Minify the linked bundle under the given policy.
///
/// `file_name` names the artifact in the generated source map.
pub fn minify_bundle(
    bundle: &str,
    file_name: &str,
    policy: &MinifyPolicy,
) -> Result<MinifyOutcome> {
    // The codegen's comment handling understands legal comments. Promote
    // comments the retention predicate keeps into legal form first, so
    // markers like @cc_on survive alongside @license and @preserve.
    let promoted;
    let source: &str = match policy.comments {
        CommentPolicy::Strip => bundle,
        CommentPolicy::KeepAnnotated => {
            promoted = promote_annotated_comments(bundle, policy);
            &promoted
        }
    };

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| format!("{e:?}")).collect();
        return Err(Error::Link(messages.join(", ")));
    }
    let mut program = parsed.program;

    let minifier_ret = Minifier::new(MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: policy.mangle_top_level,
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::default()),
    })
    .minify(&allocator, &mut program);

    let comments = match policy.comments {
        CommentPolicy::Strip => CommentOptions {
            normal: false,
            jsdoc: false,
            legal: LegalComment::None,
            annotation: false,
        },
        CommentPolicy::KeepAnnotated => CommentOptions {
            normal: false,
            jsdoc: false,
            legal: LegalComment::Inline,
            annotation: false,
        },
    };

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments,
            source_map_path: Some(PathBuf::from(file_name)),
            ..CodegenOptions::default()
        })
        .with_scoping(minifier_ret.scoping)
        .build(&program);

    Ok(MinifyOutcome {
        code: output.code,
        map: output.map,
    })
}

/// Rewrite retained block comments to `/*! ... */` so the codegen's
/// legal-comment pass carries them through. Already-legal comments are
/// left alone.
fn promote_annotated_comments(bundle: &str, policy: &MinifyPolicy) -> String {
    static BLOCK_COMMENT: OnceLock<Regex> = OnceLock::new();
    let block_comment = BLOCK_COMMENT
        .get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern is valid"));

    block_comment
        .replace_all(bundle, |caps: &regex::Captures<'_>| {
            let comment = caps.get(0).expect("whole match").as_str();
            let body = &comment[2..comment.len() - 2];
            if policy.comments.retains(body) && !body.starts_with('!') {
                format!("/*!{body}*/")
            } else {
                comment.to_string()
            }
        })
        .into_owned()
}
