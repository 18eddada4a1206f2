#![windows_subsystem = "windows"]

use collatz_hailstone_net::*;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Points};
use num_bigint::BigUint;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_title("Collatz Hailstone Network"),
        ..Default::default()
    };
    eframe::run_native(
        "collatz-net",
        options,
        Box::new(|cc| {
            setup_japanese_font(&cc.egui_ctx);
            Ok(Box::new(NetApp::default()))
        }),
    )
}

fn setup_japanese_font(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    let font_paths = [
        "C:\\Windows\\Fonts\\YuGothR.ttc",
        "C:\\Windows\\Fonts\\YuGothM.ttc",
        "C:\\Windows\\Fonts\\msgothic.ttc",
        "C:\\Windows\\Fonts\\meiryo.ttc",
    ];
    for path in &font_paths {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert(
                "japanese".to_owned(),
                egui::FontData::from_owned(data),
            );
            fonts.families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .insert(0, "japanese".to_owned());
            fonts.families
                .entry(egui::FontFamily::Monospace)
                .or_default()
                .push("japanese".to_owned());
            break;
        }
    }
    ctx.set_fonts(fonts);
}

// ─── データ構造 ─────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Graph, Trace, Verify }

#[derive(PartialEq, Clone, Copy)]
enum LayoutPolicy { LogRadius, DoublingRadius, Spiral, NumberLine, Tree }

impl LayoutPolicy {
    fn label(&self) -> &'static str {
        match self {
            LayoutPolicy::LogRadius => "対数半径",
            LayoutPolicy::DoublingRadius => "倍加半径",
            LayoutPolicy::Spiral => "螺旋",
            LayoutPolicy::NumberLine => "数直線",
            LayoutPolicy::Tree => "階層木",
        }
    }
}

/// 描画用に座標へ展開済みのグラフ
struct GraphView {
    range_max: u64,
    node_count: usize,
    edge_count: usize,
    shown_edges: usize,
    /// value <= N のノード点
    in_range_points: Vec<[f64; 2]>,
    /// 軌道が N を超えて通過したノード点
    overshoot_points: Vec<[f64; 2]>,
    /// 辺セグメント [from, to]
    edge_segments: Vec<[[f64; 2]; 2]>,
    elapsed_ms: u128,
}

struct TraceDisplay {
    total_steps: u64,
    max_value_digits: usize,
    reached_one: bool,
    cancelled: bool,
    /// (step, ビット長) の折れ線データ
    bit_series: Vec<[f64; 2]>,
    steps_preview: Vec<(u64, String)>,
    elapsed_ms: u128,
}

struct TraceState {
    running: bool,
    step: u64,
    bits: usize,
    result: Option<TraceDisplay>,
}

struct VerifyDisplay {
    total_checked: u64,
    all_converged: bool,
    max_stopping_time: u64,
    max_stopping_time_number: u64,
    failures: usize,
    cancelled: bool,
    elapsed_s: f64,
}

struct VerifyState {
    running: bool,
    done: u64,
    total: u64,
    nps: f64,
    elapsed_s: f64,
    result: Option<VerifyDisplay>,
}

struct NetApp {
    tab: Tab,
    // グラフタブ
    n_input: String,
    policy: LayoutPolicy,
    filter_even_edges: bool,
    graph_view: Option<GraphView>,
    graph_error: Option<String>,
    // 軌道タブ
    trace_n_input: String,
    trace_max_steps_input: String,
    trace_state: Arc<Mutex<TraceState>>,
    trace_cancel: Arc<AtomicBool>,
    // 検証タブ
    verify_start_input: String,
    verify_end_input: String,
    verify_state: Arc<Mutex<VerifyState>>,
    verify_cancel: Arc<AtomicBool>,
}

impl Default for NetApp {
    fn default() -> Self {
        Self {
            tab: Tab::Graph,
            n_input: "1023".to_string(),
            policy: LayoutPolicy::LogRadius,
            filter_even_edges: false,
            graph_view: None,
            graph_error: None,
            trace_n_input: "27".to_string(),
            trace_max_steps_input: "100000".to_string(),
            trace_state: Arc::new(Mutex::new(TraceState {
                running: false, step: 0, bits: 0, result: None,
            })),
            trace_cancel: Arc::new(AtomicBool::new(false)),
            verify_start_input: "1".to_string(),
            verify_end_input: "999999".to_string(),
            verify_state: Arc::new(Mutex::new(VerifyState {
                running: false, done: 0, total: 0, nps: 0.0, elapsed_s: 0.0, result: None,
            })),
            verify_cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl eframe::App for NetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        {
            let trace_running = self.trace_state.lock().unwrap().running;
            let verify_running = self.verify_state.lock().unwrap().running;
            if trace_running || verify_running {
                ctx.request_repaint();
            }
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Collatz Hailstone Network");
                ui.separator();
                ui.selectable_value(&mut self.tab, Tab::Graph, "グラフ");
                ui.selectable_value(&mut self.tab, Tab::Trace, "軌道");
                ui.selectable_value(&mut self.tab, Tab::Verify, "検証");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Graph => self.show_graph_tab(ui),
            Tab::Trace => self.show_trace_tab(ui),
            Tab::Verify => self.show_verify_tab(ui),
        });
    }
}

impl NetApp {
    // ─── グラフタブ ──────────────────────────────

    fn show_graph_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("N =");
            ui.add(egui::TextEdit::singleline(&mut self.n_input).desired_width(80.0));
            for policy in [
                LayoutPolicy::LogRadius,
                LayoutPolicy::DoublingRadius,
                LayoutPolicy::Spiral,
                LayoutPolicy::NumberLine,
                LayoutPolicy::Tree,
            ] {
                ui.selectable_value(&mut self.policy, policy, policy.label());
            }
            ui.checkbox(&mut self.filter_even_edges, "偶数-偶数辺を除く");
            if ui.button("構築").clicked() {
                self.rebuild_graph();
            }
        });

        if let Some(err) = &self.graph_error {
            ui.colored_label(egui::Color32::from_rgb(220, 50, 50), err);
        }

        let Some(view) = &self.graph_view else {
            ui.label("N とレイアウトを選んで「構築」を押してください。");
            return;
        };

        ui.horizontal(|ui| {
            ui.label(format!(
                "1..={}: {} ノード / {} 辺（表示 {} 辺） / {} ms",
                view.range_max, view.node_count, view.edge_count,
                view.shown_edges, view.elapsed_ms
            ));
        });

        let edge_color = egui::Color32::from_gray(120);
        let in_range_color = egui::Color32::from_rgb(140, 190, 240);   // lightblue
        let overshoot_color = egui::Color32::from_gray(180);           // lightgray

        Plot::new("graph_plot")
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                for seg in &view.edge_segments {
                    plot_ui.line(
                        Line::new(PlotPoints::from(seg.to_vec()))
                            .color(edge_color)
                            .width(0.5),
                    );
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(view.overshoot_points.clone()))
                        .color(overshoot_color)
                        .radius(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(view.in_range_points.clone()))
                        .color(in_range_color)
                        .radius(2.5),
                );
            });
    }

    fn rebuild_graph(&mut self) {
        self.graph_error = None;
        self.graph_view = None;

        let n = match self.n_input.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                self.graph_error = Some(format!("N を解析できません: {}", self.n_input));
                return;
            }
        };

        let timer = Instant::now();
        let g = match build_graph(n, DEFAULT_MAX_STEPS) {
            Ok(g) => g,
            Err(e) => {
                self.graph_error = Some(format!("グラフ構築に失敗: {}", e));
                return;
            }
        };

        let pos = match self.policy {
            LayoutPolicy::LogRadius => log_radius_layout(&g),
            LayoutPolicy::DoublingRadius => doubling_radius_layout(&g),
            LayoutPolicy::Spiral => spiral_layout(&g),
            LayoutPolicy::NumberLine => number_line_layout(&g),
            LayoutPolicy::Tree => {
                hierarchy_layout(&g.reversed(), Some(1), &HierarchyOptions::default())
            }
        };
        let pos = match pos {
            Ok(p) => p,
            Err(e) => {
                self.graph_error = Some(format!("レイアウト計算に失敗: {}", e));
                return;
            }
        };
        let elapsed_ms = timer.elapsed().as_millis();

        // 座標へ展開: ノード色は「値が N 以下か」で分ける
        let mut in_range_points = Vec::new();
        let mut overshoot_points = Vec::new();
        for node in g.nodes() {
            let (x, y) = pos[&node];
            if node <= n {
                in_range_points.push([x, y]);
            } else {
                overshoot_points.push([x, y]);
            }
        }

        let mut edge_segments = Vec::with_capacity(g.edge_count());
        for (a, b) in g.edges() {
            if self.filter_even_edges && a % 2 == 0 && b % 2 == 0 {
                continue;
            }
            let (x1, y1) = pos[&a];
            let (x2, y2) = pos[&b];
            edge_segments.push([[x1, y1], [x2, y2]]);
        }

        self.graph_view = Some(GraphView {
            range_max: n,
            node_count: g.node_count(),
            edge_count: g.edge_count(),
            shown_edges: edge_segments.len(),
            in_range_points,
            overshoot_points,
            edge_segments,
            elapsed_ms,
        });
    }

    // ─── 軌道タブ ──────────────────────────────

    fn show_trace_tab(&mut self, ui: &mut egui::Ui) {
        let running = self.trace_state.lock().unwrap().running;

        ui.horizontal(|ui| {
            ui.label("n =");
            ui.add(egui::TextEdit::singleline(&mut self.trace_n_input).desired_width(200.0));
            ui.label("最大ステップ =");
            ui.add(egui::TextEdit::singleline(&mut self.trace_max_steps_input).desired_width(80.0));
            if running {
                if ui.button("キャンセル").clicked() {
                    self.trace_cancel.store(true, Ordering::Relaxed);
                }
            } else if ui.button("追跡開始").clicked() {
                self.start_trace();
            }
        });

        let state = self.trace_state.lock().unwrap();
        if state.running {
            ui.label(format!("実行中... step {} | ~{}bits", state.step, state.bits));
        }
        if let Some(result) = &state.result {
            ui.separator();
            ui.label(format!(
                "総ステップ数 = {} / 最大値 {}桁 / 1に到達 = {}{}",
                result.total_steps,
                result.max_value_digits,
                if result.reached_one { "はい" } else { "いいえ" },
                if result.cancelled { " (キャンセル)" } else { "" }
            ));
            ui.label(format!("計算時間 = {} ms", result.elapsed_ms));

            // ビット長の推移
            if result.bit_series.len() > 1 {
                ui.label("ビット長の推移");
                Plot::new("trace_bits")
                    .height(160.0)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .x_axis_label("step")
                    .y_axis_label("ビット長")
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(PlotPoints::from(result.bit_series.clone())));
                    });
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("trace_preview").striped(true).show(ui, |ui| {
                    ui.label("step"); ui.label("n"); ui.end_row();
                    for (step, value) in &result.steps_preview {
                        ui.label(format!("{}", step));
                        ui.label(value.clone());
                        ui.end_row();
                    }
                });
            });
        }
    }

    fn start_trace(&mut self) {
        let n = match BigUint::from_str(&self.trace_n_input) {
            Ok(n) => n,
            Err(_) => return,
        };
        let max_steps = self.trace_max_steps_input.parse::<u64>().unwrap_or(DEFAULT_MAX_STEPS);
        self.trace_cancel.store(false, Ordering::Relaxed);
        {
            let mut state = self.trace_state.lock().unwrap();
            state.running = true;
            state.step = 0;
            state.bits = 0;
            state.result = None;
        }
        let state = self.trace_state.clone();
        let cancel = self.trace_cancel.clone();

        thread::spawn(move || {
            // パニック時も running = false を保証するガード
            let state_guard = state.clone();
            struct TraceGuard(Arc<Mutex<TraceState>>);
            impl Drop for TraceGuard {
                fn drop(&mut self) {
                    if let Ok(mut s) = self.0.lock() {
                        s.running = false;
                    }
                }
            }
            let _guard = TraceGuard(state_guard);

            let timer = Instant::now();
            let state_cb = state.clone();
            let last_update = Mutex::new(Instant::now());
            let result = trace_trajectory_cancellable(&n, max_steps, &cancel, |step, bits| {
                let now = Instant::now();
                if let Ok(mut lu) = last_update.try_lock() {
                    if now.duration_since(*lu).as_millis() >= 200 {
                        let mut s = state_cb.lock().unwrap();
                        s.step = step;
                        s.bits = bits;
                        *lu = now;
                    }
                }
            });
            let elapsed = timer.elapsed();
            let cancelled = cancel.load(Ordering::Relaxed);

            let bit_series: Vec<[f64; 2]> = result.steps.iter()
                .enumerate()
                .map(|(i, v)| [(i + 1) as f64, v.bits() as f64])
                .collect();
            let steps_preview: Vec<(u64, String)> = result.steps.iter()
                .take(200)
                .enumerate()
                .map(|(i, v)| {
                    let s = v.to_string();
                    let shown = if s.len() <= 30 { s } else { format!("{}...({}桁)", &s[..10], s.len()) };
                    ((i + 1) as u64, shown)
                })
                .collect();

            let mut s = state.lock().unwrap();
            s.running = false;
            s.result = Some(TraceDisplay {
                total_steps: result.total_steps,
                max_value_digits: result.max_value.to_string().len(),
                reached_one: result.reached_one,
                cancelled,
                bit_series,
                steps_preview,
                elapsed_ms: elapsed.as_millis(),
            });
        });
    }

    // ─── 検証タブ ──────────────────────────────

    fn show_verify_tab(&mut self, ui: &mut egui::Ui) {
        let running = self.verify_state.lock().unwrap().running;

        ui.horizontal(|ui| {
            ui.label("範囲 =");
            ui.add(egui::TextEdit::singleline(&mut self.verify_start_input).desired_width(100.0));
            ui.label("〜");
            ui.add(egui::TextEdit::singleline(&mut self.verify_end_input).desired_width(100.0));
            if running {
                if ui.button("キャンセル").clicked() {
                    self.verify_cancel.store(true, Ordering::Relaxed);
                }
            } else if ui.button("検証開始").clicked() {
                self.start_verify();
            }
        });

        let state = self.verify_state.lock().unwrap();
        if state.running {
            if state.total > 0 {
                let pct = state.done as f64 / state.total as f64;
                ui.add(egui::ProgressBar::new(pct as f32)
                    .text(format!("{}/{} ({:.0} nums/s)", state.done, state.total, state.nps)));
            }
            ui.label(format!("経過 {:.1}s", state.elapsed_s));
        }
        if let Some(result) = &state.result {
            ui.separator();
            ui.label(format!(
                "検証 {} 個 / 全て収束 = {}{}",
                result.total_checked,
                if result.all_converged { "はい" } else { "いいえ" },
                if result.cancelled { " (キャンセル)" } else { "" }
            ));
            ui.label(format!(
                "最大停止時間 = {} (n={})",
                result.max_stopping_time, result.max_stopping_time_number
            ));
            if result.failures > 0 {
                ui.colored_label(
                    egui::Color32::from_rgb(220, 50, 50),
                    format!("収束しなかった数 = {} 個", result.failures),
                );
            }
            ui.label(format!("計算時間 = {:.1}s", result.elapsed_s));
        }
    }

    fn start_verify(&mut self) {
        let start = match self.verify_start_input.parse::<u64>() {
            Ok(v) => v,
            Err(_) => return,
        };
        let end = match self.verify_end_input.parse::<u64>() {
            Ok(v) => v,
            Err(_) => return,
        };
        self.verify_cancel.store(false, Ordering::Relaxed);
        {
            let mut state = self.verify_state.lock().unwrap();
            state.running = true;
            state.done = 0;
            state.total = 0;
            state.nps = 0.0;
            state.elapsed_s = 0.0;
            state.result = None;
        }
        let state = self.verify_state.clone();
        let cancel = self.verify_cancel.clone();

        thread::spawn(move || {
            let state_guard = state.clone();
            struct VerifyGuard(Arc<Mutex<VerifyState>>);
            impl Drop for VerifyGuard {
                fn drop(&mut self) {
                    if let Ok(mut s) = self.0.lock() {
                        s.running = false;
                    }
                }
            }
            let _guard = VerifyGuard(state_guard);

            let timer = Instant::now();
            let state_cb = state.clone();
            let last_update = Mutex::new(Instant::now());
            let result = verify_range_parallel_cancellable(
                start, end, DEFAULT_MAX_STEPS, &cancel,
                |done, total| {
                    let now = Instant::now();
                    if let Ok(mut lu) = last_update.try_lock() {
                        if now.duration_since(*lu).as_millis() >= 200 {
                            let elapsed = timer.elapsed().as_secs_f64();
                            let mut s = state_cb.lock().unwrap();
                            s.done = done;
                            s.total = total;
                            s.nps = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
                            s.elapsed_s = elapsed;
                            *lu = now;
                        }
                    }
                },
            );
            let elapsed = timer.elapsed();
            let cancelled = cancel.load(Ordering::Relaxed);

            let mut s = state.lock().unwrap();
            s.running = false;
            s.result = Some(VerifyDisplay {
                total_checked: result.total_checked,
                all_converged: result.all_converged,
                max_stopping_time: result.max_stopping_time,
                max_stopping_time_number: result.max_stopping_time_number,
                failures: result.failures.len(),
                cancelled,
                elapsed_s: elapsed.as_secs_f64(),
            });
        });
    }
}
