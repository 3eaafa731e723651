use crate::app::{App, Section};
use chrono::DateTime;
use pulse_application::views::{trade_log_cells, PeriodView, TRADE_LOG_HEADERS};
use pulse_domain::services::comparison::COMPARISON_HEADERS;
use pulse_domain::services::format::{format_count, format_thousands};
use pulse_domain::value_objects::period::Period;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, List,
    ListItem, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;

const TITLE: &str = "BTC Momentum Strategy Dashboard";

const STRATEGY_OVERVIEW: [&str; 7] = [
    "Asset: BTC/USD (1-minute data, 3 months)",
    "Position Size: Fixed 0.03 BTC per trade",
    "Strategies: EMA Crossover Ensemble (5 pairs)",
    "Signal: Median of fast/slow EMA crossovers",
    "Volume Filter: Trade only when volume > 20-period average",
    "Execution: Signal generated with 2-bar lag",
    "EMA Pairs: (6,19), (6,22), (8,21), (4,26), (4,23)",
];

const FOOTER: [&str; 3] = [
    "Backtest Engine: Custom Python with EMA Ensemble",
    "Data Source: BTC 1-minute OHLC (3 months)",
    "Strategy Details: 5 EMA pairs with median signal aggregation",
];

const HEADER_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .split(outer[1]);

    draw_period_tabs(frame, outer[0], app);
    draw_sidebar(frame, body[0], app);
    draw_main(frame, body[1], app);
    draw_logs(frame, outer[2], app);
    draw_status(frame, outer[3], app);
}

fn draw_period_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Period::ALL
        .iter()
        .enumerate()
        .map(|(idx, p)| Line::from(format!("{} {}", idx + 1, p.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.period.index())
        .block(Block::default().title(TITLE).borders(Borders::ALL))
        .highlight_style(HEADER_STYLE);
    frame.render_widget(tabs, area);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = Section::ALL
        .iter()
        .map(|section| {
            let (marker, style) = if *section == app.section {
                (">", HEADER_STYLE)
            } else {
                (" ", Style::default())
            };
            ListItem::new(Line::from(Span::styled(
                format!("{marker} {}", section.label()),
                style,
            )))
        })
        .collect();
    frame.render_widget(
        List::new(items).block(Block::default().title("Sections").borders(Borders::ALL)),
        area,
    );
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App) {
    match app.section {
        Section::Overview => return draw_overview(frame, area, app),
        Section::Comparison => return draw_comparison(frame, area, app),
        _ => {}
    }

    let view = match &app.view {
        Some(Ok(view)) => view,
        Some(Err(err)) => {
            return draw_message(
                frame,
                area,
                app.section.label(),
                &format!("error: {err}"),
                Color::Red,
            )
        }
        None => return draw_no_data(frame, area, app),
    };

    match app.section {
        Section::Summary => draw_summary(frame, area, view),
        Section::EquityPnl => draw_equity_pnl(frame, area, view),
        Section::Volume => draw_volume(frame, area, view),
        Section::Volatility => draw_volatility(frame, area, view),
        Section::Signals => draw_signals(frame, area, view),
        Section::Trades => draw_trades(frame, area, view, app.trade_scroll),
        Section::Overview | Section::Comparison => {}
    }
}

fn draw_message(frame: &mut Frame, area: Rect, title: &str, msg: &str, color: Color) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(msg.to_string(), Style::default().fg(color))))
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_no_data(frame: &mut Frame, area: Rect, app: &App) {
    let msg = if app.loading {
        format!("loading results from {} {}", app.results_dir.display(), app.spinner_char())
    } else {
        format!(
            "no results loaded from {} (press g to reload)",
            app.results_dir.display()
        )
    };
    draw_message(frame, area, app.section.label(), &msg, Color::DarkGray);
}

fn draw_overview(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(TITLE, HEADER_STYLE)),
        Line::from(""),
        Line::from(Span::styled("Strategy Overview", HEADER_STYLE)),
    ];
    lines.extend(STRATEGY_OVERVIEW.iter().map(|l| Line::from(format!("  - {l}"))));
    lines.push(Line::from(""));

    lines.push(Line::from(format!("Results directory: {}", app.results_dir.display())));
    if let Some(data) = &app.data {
        for timeline in data.timelines() {
            lines.push(Line::from(format!(
                "  {:<15} {} bars ({} warm-up rows trimmed)",
                timeline.period().label(),
                format_count(timeline.len() as u64),
                timeline.trimmed_rows()
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "keys: ←/→ or 1/2/3 period | ↑/↓/Tab section | PgUp/PgDn scroll | g/F5 reload | q quit",
    ));
    lines.push(Line::from(""));
    lines.extend(
        FOOTER
            .iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(Color::DarkGray)))),
    );

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title("Overview").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_summary(frame: &mut Frame, area: Rect, view: &PeriodView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let header: Vec<Line> = view.header.lines().iter().map(|l| Line::from(*l)).collect();
    frame.render_widget(
        Paragraph::new(header).block(
            Block::default()
                .title(format!("Backtest Summary ({})", view.period.label()))
                .borders(Borders::ALL),
        ),
        chunks[0],
    );

    let rows: Vec<Row> = view
        .metrics
        .iter()
        .map(|m| Row::new(vec![Cell::from(m.metric), Cell::from(m.value.clone())]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(24), Constraint::Min(12)])
        .header(Row::new(vec!["Metric", "Value"]).style(HEADER_STYLE))
        .block(Block::default().title("Performance").borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);
}

fn draw_equity_pnl(frame: &mut Frame, area: Rect, view: &PeriodView) {
    let charts = split_halves(area);
    frame.render_widget(
        line_chart(
            "Equity Curve",
            "Equity (USD)",
            vec![line_dataset("Equity", Color::Blue, &view.series.equity)],
            &view.series.equity,
        ),
        charts[0],
    );
    frame.render_widget(
        line_chart(
            "Cumulative PnL",
            "PnL (USD)",
            vec![line_dataset("Cumulative PnL", Color::Red, &view.series.cumulative_pnl)],
            &view.series.cumulative_pnl,
        ),
        charts[1],
    );
}

fn draw_volume(frame: &mut Frame, area: Rect, view: &PeriodView) {
    let block = Block::default()
        .title("Daily Trading Volume (USD)")
        .borders(Borders::ALL);
    if view.daily_volume.is_empty() {
        frame.render_widget(Paragraph::new("no volume data").block(block), area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let count = view.daily_volume.len();
    let slot = (inner_width / count).max(1) as u16;
    let (bar_width, bar_gap) = if slot > 1 { (slot - 1, 1) } else { (1, 0) };

    let bars: Vec<Bar> = view
        .daily_volume
        .iter()
        .map(|d| {
            Bar::default()
                .value(d.volume_usd.max(0.0).round() as u64)
                .label(Line::from(d.date.format("%m-%d").to_string()))
        })
        .collect();
    let total: f64 = view.daily_volume.iter().map(|d| d.volume_usd).sum();
    let chart = BarChart::default()
        .block(block.title_bottom(format!(
            "{} days, total {} USD",
            count,
            format_thousands(total, 0)
        )))
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_volatility(frame: &mut Frame, area: Rect, view: &PeriodView) {
    let charts = split_halves(area);
    frame.render_widget(
        line_chart(
            "% Change",
            "Change (%)",
            vec![line_dataset("% Change", Color::LightRed, &view.series.pct_change)],
            &view.series.pct_change,
        ),
        charts[0],
    );
    let vol_name = format!("{}-Bar Rolling Vol", view.rolling_window);
    frame.render_widget(
        line_chart(
            &vol_name,
            "Volatility (%)",
            vec![line_dataset(&vol_name, Color::Magenta, &view.series.rolling_volatility)],
            &view.series.rolling_volatility,
        ),
        charts[1],
    );
}

fn draw_signals(frame: &mut Frame, area: Rect, view: &PeriodView) {
    let charts = split_halves(area);
    let (x_min, x_max) = x_bounds(&view.series.signal);
    let signal = Chart::new(vec![line_dataset("Signal", Color::Red, &view.series.signal)])
        .block(Block::default().title("Signals").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(time_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title("Signal")
                .bounds([-1.5, 1.5])
                .labels(vec![Line::from("-1"), Line::from("0"), Line::from("1")]),
        );
    frame.render_widget(signal, charts[0]);

    let mut datasets = vec![line_dataset("Equity", Color::Blue, &view.series.equity)];
    if !view.series.entries.is_empty() {
        datasets.push(marker_dataset("Entries", Color::Green, &view.series.entries));
    }
    if !view.series.exits.is_empty() {
        datasets.push(marker_dataset("Exits", Color::Red, &view.series.exits));
    }
    frame.render_widget(
        line_chart("Positions", "USD", datasets, &view.series.equity),
        charts[1],
    );
}

fn draw_trades(frame: &mut Frame, area: Rect, view: &PeriodView, scroll: usize) {
    if !view.has_trades() {
        draw_message(
            frame,
            area,
            "Trade Log",
            "No trades found for this period.",
            Color::Cyan,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(28)])
        .split(area);

    let visible = chunks[0].height.saturating_sub(3) as usize;
    let rows: Vec<Row> = view
        .trade_log
        .iter()
        .skip(scroll)
        .take(visible)
        .map(|trade| {
            let style = if trade.is_entry && !trade.is_exit {
                Style::default().fg(Color::Green)
            } else if trade.is_exit && !trade.is_entry {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Row::new(trade_log_cells(trade).into_iter().map(Cell::from)).style(style)
        })
        .collect();
    let widths = [
        Constraint::Length(19),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(TRADE_LOG_HEADERS.to_vec()).style(HEADER_STYLE))
        .block(
            Block::default()
                .title(format!(
                    "Trade Log ({} events, from #{})",
                    view.trade_log.len(),
                    scroll + 1
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, chunks[0]);

    let rows: Vec<Row> = view
        .signal_distribution
        .iter()
        .map(|c| Row::new(vec![Cell::from(c.label), Cell::from(format_count(c.count as u64))]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(6)])
        .header(Row::new(vec!["Signal", "Count"]).style(HEADER_STYLE))
        .block(Block::default().title("Signal Distribution").borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);
}

fn draw_comparison(frame: &mut Frame, area: Rect, app: &App) {
    if app.data.is_none() {
        return draw_no_data(frame, area, app);
    }
    let rows: Vec<Row> = app
        .comparison
        .iter()
        .map(|row| {
            let style = if row.period == app.period {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(row.cells().into_iter().map(Cell::from)).style(style)
        })
        .collect();
    let widths = [
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(13),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(COMPARISON_HEADERS.to_vec()).style(HEADER_STYLE))
        .block(
            Block::default()
                .title("Performance Comparison Across Periods")
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn draw_logs(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .logs
        .lock()
        .tail(max_lines, app.log_scroll)
        .into_iter()
        .map(Line::from)
        .collect();
    let title = if app.log_scroll > 0 {
        format!("Logs (-{})", app.log_scroll)
    } else {
        "Logs".to_string()
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = &app.last_error {
        Line::from(Span::styled(format!("error: {err}"), Style::default().fg(Color::Red)))
    } else if app.loading {
        Line::from(Span::styled(
            format!("loading {}", app.spinner_char()),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(info) = &app.info_message {
        Line::from(Span::styled(format!("info: {info}"), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            format!("{} | {}", app.period.label(), app.section.label()),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Left), area);
}

fn split_halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn line_dataset<'a>(name: &str, color: Color, data: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .name(name.to_string())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn marker_dataset<'a>(name: &str, color: Color, data: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .name(name.to_string())
        .marker(Marker::Block)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(color))
        .data(data)
}

/// Line chart whose axes are fitted to `bounds_from`.
fn line_chart<'a>(
    title: &str,
    y_title: &str,
    datasets: Vec<Dataset<'a>>,
    bounds_from: &[(f64, f64)],
) -> Chart<'a> {
    let (x_min, x_max) = x_bounds(bounds_from);
    let (y_min, y_max) = y_bounds(bounds_from);
    Chart::new(datasets)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(time_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title(y_title.to_string())
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max)),
        )
}

fn x_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    (x_min, x_max)
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let (min, max) = points
        .iter()
        .map(|p| p.1)
        .filter(|y| y.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn axis_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    [min, mid, max]
        .into_iter()
        .map(|v| Line::from(format!("{v:.2}")))
        .collect()
}

fn time_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    [min, mid, max]
        .into_iter()
        .map(|secs| {
            let label = DateTime::from_timestamp(secs as i64, 0)
                .map(|ts| ts.format("%m-%d %H:%M").to_string())
                .unwrap_or_default();
            Line::from(label)
        })
        .collect()
}
