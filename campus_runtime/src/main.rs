use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use campus_ledger::domain::Language;
use campus_ledger::events::Intent;
use campus_ledger::seed::seeded_state;

use campus_runtime::config::{Args, Command};
use campus_runtime::drift::{compare_states, verify_determinism};
use campus_runtime::logging::init_tracing;
use campus_runtime::recommend::RecommendationRequest;
use campus_runtime::router::{self, compose_review, Dispatch, ViewRouter};
use campus_runtime::session::Session;
use campus_runtime::{replay, snapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if let Err(e) = args.validate() {
        bail!("configuration error: {}", e);
    }

    let mut session = args
        .open_session(seeded_state())
        .with_context(|| format!("opening session {:?}", args.session))?;
    info!(
        session = session.session_id(),
        journaled = session.is_journaled(),
        sequence = session.current_sequence(),
        "session ready"
    );

    let mut view = ViewRouter::new(session.state().user.role);
    if args.english {
        view.set_language(Language::English);
    }

    match args.command.clone() {
        Command::Status => print_status(&session, view.language()),
        Command::Catalog { category } => {
            let language = view.language();
            for a in session.state().catalog.iter() {
                if category.is_some_and(|c| c != a.category) {
                    continue;
                }
                println!(
                    "{:<4} {:<10} {:>4}/{:<4} {}  {} {}",
                    a.id,
                    a.category,
                    a.registered_count,
                    a.max_capacity,
                    a.display_title(language),
                    a.date,
                    a.time
                );
            }
        }
        Command::Join { activity_id } => {
            let d = view.dispatch(&mut session, Intent::join(activity_id))?;
            report(&d);
        }
        Command::Complete { activity_id } => {
            let d = view.dispatch(&mut session, Intent::complete(activity_id))?;
            report(&d);
        }
        Command::Save { activity_id } => {
            let d = view.dispatch(&mut session, Intent::toggle_save(activity_id.clone()))?;
            let saved = session.state().user.has_saved(&activity_id);
            println!("{} {}", activity_id, if saved { "saved" } else { "unsaved" });
            report(&d);
        }
        Command::Redeem { reward_id } => match view.redeem_listed(&mut session, &reward_id)? {
            Some(d) => report(&d),
            None => bail!("unknown reward {:?}", reward_id),
        },
        Command::Review {
            activity_id,
            rating,
            content,
        } => {
            let Some(review) =
                compose_review(session.state(), &activity_id, rating, content, now_timestamp())
            else {
                bail!("unknown activity {:?}", activity_id);
            };
            let d = view.dispatch(&mut session, Intent::SubmitReview { review })?;
            report(&d);
        }
        Command::Recommend { interests } => {
            let interests = (!interests.is_empty()).then_some(interests);
            let request = RecommendationRequest::for_user(session.state(), interests);
            let recommender = args.build_recommender();
            info!(backend = recommender.id(), "requesting recommendation");
            println!("{}", recommender.recommend(&request).await);
        }
        Command::Summarize { activity_id } => {
            let Some(activity) = session.state().catalog.get(&activity_id) else {
                bail!("unknown activity {:?}", activity_id);
            };
            let recommender = args.build_recommender();
            println!(
                "{}",
                recommender
                    .summarize(&activity.title, &activity.description)
                    .await
            );
        }
        Command::Replay => replay_and_check(&mut session)?,
    }

    Ok(())
}

fn report(d: &Dispatch) {
    if let Some(notice) = &d.notice {
        println!("{}", notice);
    }
    if let Some(reason) = &d.result.reason {
        // Notices print for no-ops too.
        println!("(no change: {})", reason);
    } else if d.result.points_delta() != 0 {
        println!("points: {} -> {}", d.result.points_before, d.result.points_after);
    }
}

fn print_status(session: &Session, language: Language) {
    let state = session.state();
    let user = &state.user;
    println!("{} ({})", user.name, user.role);
    println!("points: {}", user.points);

    let titles = |v: Vec<&campus_ledger::domain::Activity>| {
        v.iter()
            .map(|a| format!("{} {}", a.id, a.display_title(language)))
            .collect::<Vec<_>>()
    };
    println!("upcoming: {:?}", titles(router::upcoming(state)));
    println!("past: {:?}", titles(router::past(state)));
    println!("saved: {:?}", user.saved_activities);
    println!("redeemed: {:?}", user.redeemed_rewards);
    println!("reviews: {}", user.reviews.len());

    let affordable: Vec<String> = router::affordable_rewards(state)
        .iter()
        .map(|r| format!("{} ({})", r.id, r.cost))
        .collect();
    println!("affordable rewards: {:?}", affordable);
    println!("sequence: {}  hash: {}", session.current_sequence(), session.current_hash());
}

fn replay_and_check(session: &mut Session) -> anyhow::Result<()> {
    let events = session.journal_events()?;
    let live = session.state().clone();
    let (replayed, hash) = session.replay_full()?;
    let agreed = verify_determinism(session.seed(), &events)?;
    println!("events: {}  hash: {}", events.len(), hash);

    let diff = compare_states(&live, &replayed);
    if !diff.is_empty() || agreed != hash {
        bail!("replayed state drifted from live state: {:?}", diff);
    }

    let Some(dir) = session.snapshot_dir() else {
        return Ok(());
    };
    let Some(snap) = snapshot::load_latest_snapshot(&dir)? else {
        println!("no snapshots");
        return Ok(());
    };

    let recorded = snapshot::verify_snapshot(&snap)?;
    let prefix_len = usize::try_from(snap.sequence).unwrap_or(usize::MAX).min(events.len());
    let (at_snapshot, prefix_hash) = replay::rebuild_state(session.seed(), &events[..prefix_len])?;
    if prefix_hash != snap.hash {
        warn!(sequence = snap.sequence, "snapshot disagrees with journal");
        bail!(
            "snapshot {} drifted from journal: {:?}",
            snap.sequence,
            compare_states(&at_snapshot, &recorded)
        );
    }
    println!("snapshot {} verified", snap.sequence);
    Ok(())
}

fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}
