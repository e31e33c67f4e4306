use tracing_subscriber::EnvFilter;

/// Moon-glyph badge for a 0-10 vote average, one glyph step per point.
pub fn numeric_to_emoji_rating(vote_average: f64) -> &'static str {
    match vote_average.round() as i32 {
        i32::MIN..=0 => "",
        1 => "🌗",
        2 => "🌕",
        3 => "🌕🌗",
        4 => "🌕🌕",
        5 => "🌕🌕🌗",
        6 => "🌕🌕🌕",
        7 => "🌕🌕🌕🌗",
        8 => "🌕🌕🌕🌕",
        9 => "🌕🌕🌕🌕🌗",
        _ => "🌕🌕🌕🌕🌕",
    }
}

/// Logs go to stderr. Stdout carries only the rendered view JSON, so
/// `cinescope /cinema | jq` stays parseable at any `RUST_LOG` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
