use collatz_hailstone_net::*;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

fn print_usage() {
    eprintln!("コラッツ・ハイルストーン軌道ネットワーク");
    eprintln!();
    eprintln!("使い方:");
    eprintln!("  collatz-net build <n> [filter]         1..n の軌道グラフ構築 (filter: 偶数-偶数辺を除く)");
    eprintln!("  collatz-net layout <n> <policy>        レイアウト計算 (log|doubling|spiral|line|tree)");
    eprintln!("  collatz-net trace <n> [max_steps]      単一開始値の軌道追跡 (任意桁)");
    eprintln!("  collatz-net verify <start> <end>       範囲の収束検証 (並列)");
    eprintln!();
    eprintln!("結果は自動的に output/ フォルダに保存されます。");
    eprintln!();
    eprintln!("例:");
    eprintln!("  collatz-net build 1023           1..1023 の軌道グラフ");
    eprintln!("  collatz-net build 1023 filter    偶数-偶数辺を除いた辺リスト");
    eprintln!("  collatz-net layout 1023 spiral   螺旋レイアウトの座標");
    eprintln!("  collatz-net layout 15 tree       1 を根とする木レイアウト");
    eprintln!("  collatz-net trace 27             27 から 1 までの軌道");
    eprintln!("  collatz-net verify 1 9999        1〜9999 の収束検証");
}

fn output_dir() -> PathBuf {
    let dir = PathBuf::from("output");
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn timestamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let s = now % 60;
    let m = (now / 60) % 60;
    let h = (now / 3600) % 24;
    let days = now / 86400;
    let y = 1970 + days / 365;
    let d = days % 365;
    format!("{:04}{:03}_{:02}{:02}{:02}", y, d, h, m, s)
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "build" => cmd_build(&args[2..]),
        "layout" => cmd_layout(&args[2..]),
        "trace" => cmd_trace(&args[2..]),
        "verify" => cmd_verify(&args[2..]),
        _ => {
            eprintln!("不明なコマンド: {}", args[1]);
            print_usage();
        }
    }
}

fn parse_u64(s: &str) -> u64 {
    s.parse::<u64>().unwrap_or_else(|_| {
        eprintln!("数値を解析できません: {}", s);
        std::process::exit(1);
    })
}

fn build_or_exit(n: u64) -> CollatzGraph {
    build_graph(n, DEFAULT_MAX_STEPS).unwrap_or_else(|e| {
        eprintln!("グラフ構築に失敗: {}", e);
        std::process::exit(1);
    })
}

fn cmd_build(args: &[String]) {
    if args.is_empty() {
        eprintln!("使い方: collatz-net build <n> [filter]");
        return;
    }

    let n = parse_u64(&args[0]);
    let filter = args.get(1).map(|s| s == "filter").unwrap_or(false);

    let timer = Instant::now();
    let g = build_or_exit(n);
    let elapsed = timer.elapsed();

    println!("範囲           = 1..={}", n);
    println!("ノード数       = {}", g.node_count());
    println!("辺数           = {}", g.edge_count());
    println!("計算時間       = {:?}", elapsed);

    // 停止時間の最大（グラフ経路長）
    let mut max_st = 0u64;
    let mut max_st_n = 1u64;
    for node in g.nodes() {
        if let Some(st) = g.stopping_time(node) {
            if st > max_st {
                max_st = st;
                max_st_n = node;
            }
        }
    }
    println!("最大停止時間   = {} (n={})", max_st, max_st_n);

    // 辺リスト CSV 保存（filter 指定時は偶数-偶数辺を除く: 表示層の慣例）
    let suffix = if filter { "_filtered" } else { "" };
    let filename = format!("edges_n{}{}_{}.csv", n, suffix, timestamp());
    let path = output_dir().join(&filename);
    if let Ok(file) = File::create(&path) {
        let mut w = BufWriter::new(file);
        writeln!(w, "from,to").ok();
        for (a, b) in g.edges() {
            if filter && a % 2 == 0 && b % 2 == 0 {
                continue;
            }
            writeln!(w, "{},{}", a, b).ok();
        }
        w.flush().ok();
        println!("\n辺リスト保存: {}", path.display());
    }
}

fn cmd_layout(args: &[String]) {
    if args.len() < 2 {
        eprintln!("使い方: collatz-net layout <n> <policy>");
        eprintln!("policy: log | doubling | spiral | line | tree");
        return;
    }

    let n = parse_u64(&args[0]);
    let policy = args[1].as_str();

    let g = build_or_exit(n);

    let timer = Instant::now();
    let pos: HashMap<u64, Pos> = match policy {
        "log" => log_radius_layout(&g),
        "doubling" => doubling_radius_layout(&g),
        "spiral" => spiral_layout(&g),
        "line" => number_line_layout(&g),
        // 木表示: 辺を反転して 1 を根に取る
        "tree" => hierarchy_layout(&g.reversed(), Some(1), &HierarchyOptions::default()),
        _ => {
            eprintln!("不明なレイアウト: {}", policy);
            std::process::exit(1);
        }
    }
    .unwrap_or_else(|e| {
        eprintln!("レイアウト計算に失敗: {}", e);
        std::process::exit(1);
    });
    let elapsed = timer.elapsed();

    println!("範囲           = 1..={}", n);
    println!("レイアウト     = {}", policy);
    println!("ノード数       = {}", pos.len());
    println!("計算時間       = {:?}", elapsed);

    let filename = format!("layout_{}_n{}_{}.csv", policy, n, timestamp());
    let path = output_dir().join(&filename);
    if let Ok(file) = File::create(&path) {
        let mut w = BufWriter::new(file);
        writeln!(w, "node,x,y").ok();
        // 再現確認しやすいようノード順に出力
        let mut nodes: Vec<u64> = pos.keys().copied().collect();
        nodes.sort_unstable();
        for node in nodes {
            let (x, y) = pos[&node];
            writeln!(w, "{},{},{}", node, x, y).ok();
        }
        w.flush().ok();
        println!("\n座標保存: {}", path.display());
    }
}

fn cmd_trace(args: &[String]) {
    if args.is_empty() {
        eprintln!("使い方: collatz-net trace <n> [max_steps]");
        return;
    }

    let n = BigUint::from_str(&args[0]).unwrap_or_else(|_| {
        eprintln!("数値を解析できません: {}", args[0]);
        std::process::exit(1);
    });
    let max_steps = args
        .get(1)
        .map(|s| parse_u64(s))
        .unwrap_or(DEFAULT_MAX_STEPS);

    println!("軌道追跡: n={}", n);
    println!("(最大 {} ステップ)", max_steps);
    println!();

    let timer = Instant::now();
    let last_print = std::cell::Cell::new(Instant::now());
    let no_cancel = std::sync::atomic::AtomicBool::new(false);
    let result = trace_trajectory_cancellable(
        &n,
        max_steps,
        &no_cancel,
        |step, bits| {
            let now = Instant::now();
            if now.duration_since(last_print.get()).as_millis() >= 1000 {
                let elapsed = timer.elapsed();
                eprint!(
                    "\x1b[2K\r  [{:.1}s] step {} | ~{}bits",
                    elapsed.as_secs_f64(),
                    step,
                    bits
                );
                last_print.set(now);
            }
        },
    );
    let elapsed = timer.elapsed();
    eprintln!();

    // 画面表示（長すぎる場合は省略）
    let show_limit = 50;
    println!("  {:>6}  {:>30}", "step", "n");
    println!("  {:>6}  {:>30}", 0, format_big(&n));
    for (i, value) in result.steps.iter().enumerate() {
        if i < show_limit || i >= result.steps.len().saturating_sub(5) {
            println!("  {:>6}  {:>30}", i + 1, format_big(value));
        } else if i == show_limit {
            println!(
                "  ... ({} ステップ省略) ...",
                result.steps.len().saturating_sub(show_limit + 5)
            );
        }
    }

    println!();
    println!("--- 統計 ---");
    println!("総ステップ数   = {}", result.total_steps);
    println!("最大値         = {}", format_big(&result.max_value));
    println!("最大値の桁数   = {}", result.max_value.to_string().len());
    println!("1に到達        = {}", if result.reached_one { "はい" } else { "いいえ" });
    println!("計算時間       = {:?}", elapsed);

    let filename = format!("trace_{}_s{}_{}.csv", short_n(&n), max_steps, timestamp());
    let path = output_dir().join(&filename);
    if let Ok(file) = File::create(&path) {
        let mut w = BufWriter::new(file);
        writeln!(w, "step,n,digits").ok();
        writeln!(w, "0,{},{}", n, n.to_string().len()).ok();
        for (i, value) in result.steps.iter().enumerate() {
            writeln!(w, "{},{},{}", i + 1, value, value.to_string().len()).ok();
        }
        w.flush().ok();
        println!("\n軌道CSV保存: {}", path.display());
    }
}

fn cmd_verify(args: &[String]) {
    if args.len() < 2 {
        eprintln!("使い方: collatz-net verify <start> <end>");
        return;
    }

    let start = parse_u64(&args[0]);
    let end = parse_u64(&args[1]);
    let max_steps = DEFAULT_MAX_STEPS;

    let num_threads = rayon::current_num_threads();
    println!("範囲収束検証: [{}, {}]", start, end);
    println!("(最大 {} ステップ/数、{}スレッド並列)", max_steps, num_threads);
    println!();

    let timer = Instant::now();
    let last_print = std::sync::Mutex::new(Instant::now());
    let result = verify_range_parallel(start, end, max_steps, |done, total| {
        if total > 0 {
            let now = Instant::now();
            if let Ok(mut lp) = last_print.try_lock() {
                if now.duration_since(*lp).as_millis() >= 500 {
                    let elapsed = timer.elapsed();
                    let pct = done as f64 / total as f64 * 100.0;
                    let nps = done as f64 / elapsed.as_secs_f64();
                    eprint!(
                        "\x1b[2K\r  [{:.1}s] {}/{} ({:.1}%) | {:.0} nums/s",
                        elapsed.as_secs_f64(),
                        done,
                        total,
                        pct,
                        nps
                    );
                    *lp = now;
                }
            }
        }
    });
    let elapsed = timer.elapsed();

    eprintln!();
    println!();
    println!("--- 結果 ---");
    println!("検証した数     = {}", result.total_checked);
    println!("全て収束       = {}", if result.all_converged { "はい" } else { "いいえ" });
    println!(
        "最大停止時間   = {} (n={})",
        result.max_stopping_time, result.max_stopping_time_number
    );
    println!("計算時間       = {:?}", elapsed);

    if !result.failures.is_empty() {
        println!("収束しなかった数 = {} 個", result.failures.len());
        for f in &result.failures[..result.failures.len().min(10)] {
            println!("  {}", f);
        }
    }

    let filename = format!("verify_{}-{}_s{}_{}.txt", start, end, max_steps, timestamp());
    let path = output_dir().join(&filename);
    if let Ok(mut f) = File::create(&path) {
        writeln!(f, "# collatz-net verify").ok();
        writeln!(f, "range = [{}, {}]", start, end).ok();
        writeln!(f, "max_steps_per_number = {}", max_steps).ok();
        writeln!(f, "threads = {}", num_threads).ok();
        writeln!(f, "total_checked = {}", result.total_checked).ok();
        writeln!(f, "all_converged = {}", result.all_converged).ok();
        writeln!(f, "max_stopping_time = {}", result.max_stopping_time).ok();
        writeln!(f, "max_stopping_time_number = {}", result.max_stopping_time_number).ok();
        writeln!(f, "failures = {}", result.failures.len()).ok();
        writeln!(f, "elapsed = {:?}", elapsed).ok();
        if !result.failures.is_empty() {
            writeln!(f, "\n# 収束しなかった数:").ok();
            for fail in &result.failures {
                writeln!(f, "{}", fail).ok();
            }
        }
        println!("\n保存: {}", path.display());
    }
}

fn format_big(n: &BigUint) -> String {
    let s = n.to_string();
    if s.len() <= 30 {
        s
    } else {
        format!("{}...{} ({}桁)", &s[..10], &s[s.len() - 10..], s.len())
    }
}

fn short_n(n: &BigUint) -> String {
    let s = n.to_string();
    if s.len() <= 16 {
        s
    } else {
        format!("{}..{}d", &s[..6], s.len())
    }
}
