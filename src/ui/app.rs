//! Preview state and TUI event loop
//!
//! Draws the current layout on a ratatui canvas and drives force refinement
//! one tick per frame.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};
use tracing::warn;

use crate::analysis::AnalysisResult;
use crate::graph::{classify_all, Category, ImportGraph};
use crate::layout::{LayoutSession, LayoutStrategy};

/// Time between frames while waiting for input.
const FRAME: Duration = Duration::from_millis(16);

/// Something the event loop has to do outside the app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Re-run the analysis and load the new graph
    Reload,
}

/// Application state
pub struct App {
    session: LayoutSession,
    /// Left edge of the visible window, in layout coordinates
    pub pan_x: f32,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Last status message shown in the footer
    pub status: String,
    categories: HashMap<String, Category>,
}

impl App {
    /// Create a preview over a session that already holds a graph
    pub fn new(session: LayoutSession) -> Self {
        let mut app = Self {
            session,
            pan_x: 0.0,
            should_quit: false,
            status: String::new(),
            categories: HashMap::new(),
        };
        app.refresh_categories();
        app
    }

    pub fn session(&self) -> &LayoutSession {
        &self.session
    }

    fn refresh_categories(&mut self) {
        self.categories = classify_all(self.session.nodes(), self.session.edges())
            .into_iter()
            .map(|c| (c.node.id.clone(), c.category))
            .collect();
    }

    /// Replace the graph with a fresh analysis result
    pub fn load_graph(&mut self, graph: &ImportGraph) {
        let (nodes, edges) = graph.to_parts();
        self.session.set_graph(nodes, edges);
        self.refresh_categories();
        self.pan_x = 0.0;
        self.status = format!(
            "Reloaded {} nodes (data version {})",
            graph.node_count(),
            self.session.data_version()
        );
    }

    pub fn set_strategy(&mut self, strategy: LayoutStrategy) {
        let mut config = self.session.config().clone();
        config.strategy = strategy;
        self.session.set_config(config);
        self.pan_x = 0.0;
        self.status = format!("Layout: {}", strategy);
    }

    pub fn toggle_external(&mut self) {
        let mut config = self.session.config().clone();
        config.filter.show_external = !config.filter.show_external;
        let shown = config.filter.show_external;
        self.session.set_config(config);
        self.clamp_pan();
        self.status = if shown {
            "External packages shown".to_string()
        } else {
            "External packages hidden".to_string()
        };
    }

    fn pan_step(&self) -> f32 {
        self.session.config().viewport_width / 4.0
    }

    fn max_pan(&self) -> f32 {
        (self.session.layout().width - self.session.config().viewport_width).max(0.0)
    }

    fn clamp_pan(&mut self) {
        self.pan_x = self.pan_x.clamp(0.0, self.max_pan());
    }

    pub fn pan_left(&mut self) {
        self.pan_x -= self.pan_step();
        self.clamp_pan();
    }

    pub fn pan_right(&mut self) {
        self.pan_x += self.pan_step();
        self.clamp_pan();
    }

    /// Advance one frame: a single force tick if a simulation is settling.
    pub fn on_frame(&mut self) -> bool {
        self.session.tick()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Apply a key press; returns an action the caller must perform.
    pub fn handle_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('1') => self.set_strategy(LayoutStrategy::Hierarchical),
            KeyCode::Char('2') => self.set_strategy(LayoutStrategy::Circular),
            KeyCode::Char('3') => self.set_strategy(LayoutStrategy::Tree),
            KeyCode::Char('4') => self.set_strategy(LayoutStrategy::Force),
            KeyCode::Char('e') => self.toggle_external(),
            KeyCode::Char('h') | KeyCode::Left => self.pan_left(),
            KeyCode::Char('l') | KeyCode::Right => self.pan_right(),
            KeyCode::Char('r') => return Some(Action::Reload),
            _ => {}
        }
        None
    }
}

/// Run the preview until the user quits.
///
/// `reload` is called for every [`Action::Reload`]; a failed reload keeps
/// the current graph and reports the error in the footer.
pub fn run_app<B, F>(terminal: &mut Terminal<B>, app: &mut App, mut reload: F) -> io::Result<()>
where
    B: Backend,
    F: FnMut() -> AnalysisResult<ImportGraph>,
{
    loop {
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(Action::Reload) = app.handle_key(key.code) {
                        match reload() {
                            Ok(graph) => app.load_graph(&graph),
                            Err(e) => {
                                warn!(error = %e, "reload failed");
                                app.status = format!("Reload failed: {}", e);
                            }
                        }
                    }
                }
            }
        }

        app.on_frame();

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Render the application UI
fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Graph
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_graph(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let layout = app.session().layout();
    let mut title = format!(
        "importscope - {} layout - {} nodes - data v{}",
        layout.strategy,
        layout.positions.len(),
        app.session().data_version()
    );
    if app.session().is_settling() {
        title.push_str(" - settling");
    }

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn category_color(category: Option<Category>) -> Color {
    category
        .and_then(|c| c.style().fill.parse().ok())
        .unwrap_or(Color::Gray)
}

/// Draws edges and nodes; the canvas y axis points up, layout y points down.
fn render_graph(frame: &mut Frame, app: &App, area: Rect) {
    let layout = app.session().layout();
    let config = app.session().config();
    let left = app.pan_x as f64;
    let right = left + config.viewport_width as f64;
    let height = layout.height.max(config.viewport_height) as f64;

    let mut title = String::from("Graph");
    if layout.needs_panning(config.viewport_width) {
        title = format!("Graph (h/l to pan, {:.0}/{:.0})", left, layout.width);
    }

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_bounds([left, right])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for edge in app.session().edges() {
                let (Some(a), Some(b)) = (
                    layout.positions.get(&edge.from),
                    layout.positions.get(&edge.to),
                ) else {
                    continue;
                };
                ctx.draw(&CanvasLine {
                    x1: a.x as f64,
                    y1: height - a.y as f64,
                    x2: b.x as f64,
                    y2: height - b.y as f64,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();

            for (id, pos) in &layout.positions {
                let color = category_color(app.categories.get(id).copied());
                let (x, y) = (pos.x as f64, height - pos.y as f64);
                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color,
                });
                let label = id.rsplit('/').next().unwrap_or(id).to_string();
                ctx.print(x, y, Span::styled(label, Style::default().fg(color)));
            }
        });
    frame.render_widget(canvas, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("1-4", Style::default().fg(Color::Yellow)),
        Span::raw(" Layout  "),
        Span::styled("e", Style::default().fg(Color::Yellow)),
        Span::raw(" Externals  "),
        Span::styled("h/l", Style::default().fg(Color::Yellow)),
        Span::raw(" Pan  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];
    if !app.status.is_empty() {
        spans.push(Span::raw("  │  "));
        spans.push(Span::raw(app.status.clone()));
    }

    let footer = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ResolutionKind, ResolvedEdge};
    use crate::graph::GraphBuilder;
    use crate::layout::{LayoutConfig, LayoutEngine, MAX_TICKS};
    use ratatui::backend::TestBackend;

    fn test_graph(extra: usize) -> ImportGraph {
        let mut builder = GraphBuilder::new();
        builder.add_file("src/main.js");
        builder.add_file("src/app.js");
        builder.add_resolved(ResolvedEdge::new(
            "src/main.js",
            "src/app.js",
            ResolutionKind::Internal,
        ));
        builder.add_resolved(ResolvedEdge::new(
            "src/app.js",
            "react",
            ResolutionKind::External,
        ));
        for i in 0..extra {
            let path = format!("src/feature_{i}.js");
            builder.add_file(&path);
            builder.add_resolved(ResolvedEdge::new(
                "src/main.js",
                path.as_str(),
                ResolutionKind::Internal,
            ));
        }
        builder.build()
    }

    fn create_test_app(config: LayoutConfig) -> App {
        let mut session = LayoutSession::new(LayoutEngine::new(), config);
        let (nodes, edges) = test_graph(0).to_parts();
        session.set_graph(nodes, edges);
        App::new(session)
    }

    #[test]
    fn test_app_creation() {
        let app = create_test_app(LayoutConfig::default());
        assert!(!app.should_quit);
        assert_eq!(app.session().layout().positions.len(), 3);
        assert_eq!(app.categories.len(), 3);
    }

    #[test]
    fn test_strategy_keys() {
        let mut app = create_test_app(LayoutConfig::default());
        for (key, strategy) in [
            ('2', LayoutStrategy::Circular),
            ('3', LayoutStrategy::Tree),
            ('4', LayoutStrategy::Force),
            ('1', LayoutStrategy::Hierarchical),
        ] {
            assert_eq!(app.handle_key(KeyCode::Char(key)), None);
            assert_eq!(app.session().layout().strategy, strategy);
        }
    }

    #[test]
    fn test_toggle_external() {
        let mut app = create_test_app(LayoutConfig::default());
        app.handle_key(KeyCode::Char('e'));
        assert!(!app.session().layout().positions.contains_key("react"));
        assert_eq!(app.status, "External packages hidden");

        app.handle_key(KeyCode::Char('e'));
        assert!(app.session().layout().positions.contains_key("react"));
    }

    #[test]
    fn test_reload_bumps_data_version() {
        let mut app = create_test_app(LayoutConfig::default());
        assert_eq!(app.handle_key(KeyCode::Char('r')), Some(Action::Reload));

        app.load_graph(&test_graph(2));
        assert_eq!(app.session().data_version(), 2);
        assert_eq!(app.session().layout().positions.len(), 5);
    }

    #[test]
    fn test_frames_drive_force_ticks() {
        let mut app = create_test_app(LayoutConfig::new(LayoutStrategy::Force, 800.0, 600.0));
        let mut frames = 0;
        while app.on_frame() {
            frames += 1;
        }
        assert_eq!(frames, MAX_TICKS);

        let mut static_app = create_test_app(LayoutConfig::default());
        assert!(!static_app.on_frame());
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut app = create_test_app(LayoutConfig::new(
            LayoutStrategy::Hierarchical,
            200.0,
            400.0,
        ));
        app.load_graph(&test_graph(30));
        let max = app.max_pan();
        assert!(max > 0.0);

        app.pan_left();
        assert_eq!(app.pan_x, 0.0);
        for _ in 0..1000 {
            app.pan_right();
        }
        assert_eq!(app.pan_x, max);
    }

    #[test]
    fn test_quit() {
        let mut app = create_test_app(LayoutConfig::default());
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_smoke() {
        let app = create_test_app(LayoutConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("hierarchical layout"));
    }

    #[test]
    fn test_category_color() {
        assert_eq!(category_color(None), Color::Gray);
        assert_ne!(category_color(Some(Category::Hub)), Color::Gray);
    }
}
