use resume_stats_core::config::{ResumeConfig, VideoTarget};
use resume_stats_core::contract::{RepoStats, VideoStats};
use resume_stats_core::fetch::FetchedStats;
use resume_stats_core::patch::{apply_rules, PatchRule, PatchStatus};

const RESUME: &str = r"\item Media storage tool (120 stars, 45 forks) for encoding files into video.
\item Multimedia framework (130+ stars, 10 forks) for multimedia playback.
\item Showcase reached over 500k viewers and over 1.5M impressions.
";

fn stats() -> FetchedStats {
    FetchedStats::default()
        .with_repo("PulseBeat02/yt-media-storage", RepoStats { stars: 132, forks: 47 })
        .with_repo("PulseBeat02/mcav", RepoStats { stars: 160, forks: 21 })
        .with_video(VideoStats { views: 532_000 })
}

#[test]
fn repo_rule_formats_stars_and_forks_and_keeps_keyword() {
    let rule = PatchRule::repo("PulseBeat02", "yt-media-storage", "encoding").unwrap();
    let mut text = "(120 stars, 45 forks) for encoding".to_string();

    let status = rule.apply(&mut text, &stats());

    assert_eq!(text, "(130+ stars, 50 forks) for encoding");
    assert_eq!(
        status,
        PatchStatus::Applied {
            replacement: "(130+ stars, 50 forks) for encoding".into()
        }
    );
}

#[test]
fn missing_pattern_leaves_text_byte_identical() {
    let rule = PatchRule::repo("PulseBeat02", "yt-media-storage", "encoding").unwrap();
    let original = "(120 stars, 45 forks) for decoding\n";
    let mut text = original.to_string();

    let status = rule.apply(&mut text, &stats());

    assert_eq!(text, original);
    assert_eq!(status, PatchStatus::NotFound);
}

#[test]
fn unavailable_stat_leaves_placeholder_untouched() {
    let rule = PatchRule::repo("PulseBeat02", "yt-media-storage", "encoding").unwrap();
    let mut text = RESUME.to_string();

    let status = rule.apply(&mut text, &FetchedStats::default());

    assert_eq!(text, RESUME);
    assert_eq!(status, PatchStatus::Unavailable);
}

#[test]
fn only_first_occurrence_is_replaced() {
    let rule = PatchRule::viewers(false).unwrap();
    let mut text = "over 1k viewers, later over 2k viewers".to_string();

    rule.apply(&mut text, &stats());

    assert_eq!(text, "over 530k viewers, later over 2k viewers");
}

#[test]
fn keyword_with_regex_metacharacters_is_matched_literally() {
    let rule = PatchRule::repo("me", "lib", "C++ (bindings)").unwrap();
    let stats = FetchedStats::default().with_repo("me/lib", RepoStats { stars: 9, forks: 0 });
    let mut text = "(1 stars, 1 forks) for C++ (bindings)".to_string();

    rule.apply(&mut text, &stats);

    assert_eq!(text, "(10 stars, 0 forks) for C++ (bindings)");
}

#[test]
fn replacement_text_with_dollar_signs_is_not_expanded() {
    let rule = PatchRule::repo("me", "lib", "$1 budget").unwrap();
    let stats = FetchedStats::default().with_repo("me/lib", RepoStats { stars: 10, forks: 20 });
    let mut text = "(1 stars, 1 forks) for $1 budget".to_string();

    rule.apply(&mut text, &stats);

    assert_eq!(text, "(10 stars, 20 forks) for $1 budget");
}

#[test]
fn rules_from_config_patch_the_whole_document() {
    let config = ResumeConfig {
        video: Some(VideoTarget {
            video_id: "abc123".into(),
            impressions_multiplier: Some(3),
            decimal: false,
        }),
        ..ResumeConfig::default()
    };
    let rules = config.patch_rules().unwrap();
    assert_eq!(rules.len(), 4);

    let (patched, outcomes) = apply_rules(RESUME, &rules, &stats());

    assert_eq!(
        patched,
        r"\item Media storage tool (130+ stars, 50 forks) for encoding files into video.
\item Multimedia framework (160 stars, 20+ forks) for multimedia playback.
\item Showcase reached over 530k viewers and over 1M impressions.
"
    );
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.status, PatchStatus::Applied { .. })));
}

#[test]
fn impressions_use_multiplied_views() {
    let rule = PatchRule::impressions(3, true).unwrap();
    let stats = FetchedStats::default().with_video(VideoStats { views: 40_000 });
    let mut text = "seen over 10k impressions".to_string();

    rule.apply(&mut text, &stats);

    assert_eq!(text, "seen over 0.1M impressions");
}

#[test]
fn partial_stats_patch_only_available_fields() {
    let rules = ResumeConfig::default().patch_rules().unwrap();
    let stats = FetchedStats::default()
        .with_repo("PulseBeat02/mcav", RepoStats { stars: 160, forks: 21 });

    let (patched, outcomes) = apply_rules(RESUME, &rules, &stats);

    assert!(patched.contains("(120 stars, 45 forks) for encoding"));
    assert!(patched.contains("(160 stars, 20+ forks) for multimedia"));
    assert_eq!(outcomes[0].rule, "repo:PulseBeat02/mcav");
    assert!(matches!(outcomes[0].status, PatchStatus::Applied { .. }));
    assert_eq!(outcomes[1].status, PatchStatus::Unavailable);
}
