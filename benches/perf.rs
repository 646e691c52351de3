use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use matchday_terminal::api::{parse_list_json, parse_record_json};
use matchday_terminal::model::{Match, Player, Position, Standing, Team};
use matchday_terminal::store::Store;
use matchday_terminal::views::{
    LineupMemo, RECENT_MATCHES, StadiumIndex, enrich_matches, partition_lineup, rank_standings,
    recent_matches,
};

/// A season's worth of fixtures cycling through the standings' clubs.
fn season(standings: &[Standing]) -> Vec<Match> {
    let base: Vec<Match> = parse_list_json(MATCHES_JSON).unwrap();
    let ids: Vec<u32> = standings.iter().filter_map(|s| s.team.id).collect();
    (0..380u32)
        .map(|i| {
            let mut m = base[(i as usize) % base.len()].clone();
            m.id = 1000 + i;
            m.home_team_id = ids[(i as usize) % ids.len()];
            m.date = format!("2025-{:02}-{:02}T15:00:00.000Z", 8 + i % 5, 1 + i % 28);
            m
        })
        .collect()
}

fn big_squad() -> Vec<Player> {
    let team: Team = parse_record_json(TEAM_JSON).unwrap();
    let base = team.players.unwrap_or_default();
    (0..40u32)
        .map(|i| {
            let mut p = base[(i as usize) % base.len()].clone();
            p.id = 100 + i;
            p.position = Position::PITCH_ORDER[(i as usize) % 4];
            p
        })
        .collect()
}

fn bench_standings_parse(c: &mut Criterion) {
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let rows: Vec<Standing> = parse_list_json(black_box(STANDINGS_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_stadium_enrichment(c: &mut Criterion) {
    let standings: Vec<Standing> = parse_list_json(STANDINGS_JSON).unwrap();
    let matches = season(&standings);
    c.bench_function("stadium_enrichment_recent", |b| {
        b.iter(|| {
            let index = StadiumIndex::from_standings(black_box(&standings));
            let recent = recent_matches(enrich_matches(black_box(&matches), &index), RECENT_MATCHES);
            black_box(recent.len());
        })
    });
}

fn bench_rank_standings(c: &mut Criterion) {
    let standings: Vec<Standing> = parse_list_json(STANDINGS_JSON).unwrap();
    let mut rng = StdRng::seed_from_u64(26);
    c.bench_function("rank_standings", |b| {
        b.iter(|| {
            let rows = rank_standings(black_box(&standings), &mut rng);
            black_box(rows.len());
        })
    });
}

fn bench_lineup_partition(c: &mut Criterion) {
    let squad = big_squad();
    c.bench_function("lineup_partition", |b| {
        b.iter(|| {
            let lineup = partition_lineup(black_box(&squad));
            black_box(lineup.line(Position::Defender).len());
        })
    });
}

fn bench_lineup_memo_hit(c: &mut Criterion) {
    let store = Store::new(big_squad());
    let mut memo = LineupMemo::default();
    memo.get(&store);
    c.bench_function("lineup_memo_hit", |b| {
        b.iter(|| {
            let lineup = memo.get(black_box(&store));
            black_box(lineup.bench.len());
        })
    });
}

criterion_group!(
    perf,
    bench_standings_parse,
    bench_stadium_enrichment,
    bench_rank_standings,
    bench_lineup_partition,
    bench_lineup_memo_hit
);
criterion_main!(perf);

static STANDINGS_JSON: &str = include_str!("../tests/fixtures/standings.json");
static MATCHES_JSON: &str = include_str!("../tests/fixtures/matches.json");
static TEAM_JSON: &str = include_str!("../tests/fixtures/team_detail.json");
