use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_tracker::{
    format_list_amount, format_summary_amount, Category, Expense, ExpenseBook, ExpenseForm,
    FilterCriteria, FormField, KeyValueStore, Summary,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Expenses,
    Filters,
    Form,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Expenses => Page::Filters,
            Page::Filters => Page::Form,
            Page::Form => Page::Expenses,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Expenses => "Expenses",
            Page::Filters => "Filters",
            Page::Form => "Add / Edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    From,
    To,
}

impl FilterField {
    fn next(&self) -> Self {
        match self {
            FilterField::Category => FilterField::From,
            FilterField::From => FilterField::To,
            FilterField::To => FilterField::Category,
        }
    }
}

pub struct App<S: KeyValueStore> {
    pub book: ExpenseBook<S>,
    pub form: ExpenseForm,
    pub form_field: FormField,
    pub filter_field: FilterField,
    pub state: TableState,
    pub current_page: Page,
    // filtered view, recomputed after every mutation or filter change
    visible: Vec<Expense>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(book: ExpenseBook<S>) -> Self {
        let mut state = TableState::default();
        if !book.expenses().is_empty() {
            state.select(Some(0));
        }
        let visible = book.visible();

        Self {
            book,
            form: ExpenseForm::new(),
            form_field: FormField::Amount,
            filter_field: FilterField::Category,
            state,
            current_page: Page::Expenses,
            visible,
        }
    }

    pub fn visible(&self) -> &[Expense] {
        &self.visible
    }

    pub fn selected_expense(&self) -> Option<Expense> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i).cloned())
    }

    /// Recompute the visible list and keep the selection inside it
    fn refresh(&mut self) {
        self.visible = self.book.visible();
        let len = self.visible.len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    pub fn start_add(&mut self) {
        self.book.cancel_edit();
        self.form.reset_to_create();
        self.form_field = FormField::Amount;
        self.current_page = Page::Form;
    }

    pub fn start_edit_selected(&mut self) {
        let Some(selected) = self.selected_expense() else {
            return;
        };
        if let Some(expense) = self.book.begin_edit(&selected.id) {
            self.form = ExpenseForm::edit(&expense);
            self.form_field = FormField::Amount;
            self.current_page = Page::Form;
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(selected) = self.selected_expense() {
            let was_editing = self.form.editing_id() == Some(selected.id.as_str());
            self.book.delete(&selected.id);
            if was_editing {
                self.form.reset_to_create();
            }
            self.refresh();
        }
    }

    pub fn submit_form(&mut self) {
        let was_edit = self.form.is_edit();
        if let Some(submission) = self.form.submit() {
            self.book.apply(submission);
            if was_edit {
                self.form.reset_to_create();
                self.current_page = Page::Expenses;
            }
            self.refresh();
        }
    }

    pub fn cancel_form(&mut self) {
        self.book.cancel_edit();
        self.form.reset_to_create();
        self.current_page = Page::Expenses;
    }

    pub fn clear_filters(&mut self) {
        self.book.clear_filters();
        self.refresh();
    }

    fn edit_filter(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        let mut criteria = self.book.criteria().clone();
        edit(&mut criteria);
        self.book.set_criteria(criteria);
        self.refresh();
    }

    fn cycle_filter_category(&mut self, forward: bool) {
        // All → Food → Travel → Bills → Other → All
        self.edit_filter(|c| {
            c.category = match (c.category, forward) {
                (None, true) => Some(Category::Food),
                (None, false) => Some(Category::Other),
                (Some(Category::Other), true) | (Some(Category::Food), false) => None,
                (Some(cat), true) => Some(cat.next()),
                (Some(cat), false) => Some(cat.previous()),
            }
        });
    }

    fn filter_text_mut(criteria: &mut FilterCriteria, field: FilterField) -> Option<&mut String> {
        match field {
            FilterField::From => Some(&mut criteria.date_from),
            FilterField::To => Some(&mut criteria.date_to),
            FilterField::Category => None,
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.current_page {
            Page::Expenses => return self.handle_list_key(code),
            Page::Filters => self.handle_filter_key(code),
            Page::Form => self.handle_form_key(code),
        }
        false
    }

    fn handle_list_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::Char('a') => self.start_add(),
            KeyCode::Char('e') | KeyCode::Enter => self.start_edit_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('f') => self.current_page = Page::Filters,
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => {
                let len = self.visible.len();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        let field = self.filter_field;
        match code {
            KeyCode::Esc | KeyCode::Enter => self.current_page = Page::Expenses,
            KeyCode::Tab | KeyCode::Down => self.filter_field = field.next(),
            KeyCode::Right if field == FilterField::Category => self.cycle_filter_category(true),
            KeyCode::Left if field == FilterField::Category => self.cycle_filter_category(false),
            KeyCode::Backspace => self.edit_filter(|c| {
                if let Some(text) = Self::filter_text_mut(c, field) {
                    text.pop();
                }
            }),
            KeyCode::Char(ch) => self.edit_filter(|c| {
                if let Some(text) = Self::filter_text_mut(c, field) {
                    text.push(ch);
                }
            }),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        let field = self.form_field;
        match code {
            KeyCode::Esc => self.cancel_form(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => self.form_field = field.next(),
            KeyCode::Right if field == FormField::Category => {
                let next = self.form.input().category.map(|c| c.next()).unwrap_or_default();
                self.form.set_category(Some(next));
            }
            KeyCode::Left if field == FormField::Category => {
                let previous = self.form.input().category.map(|c| c.previous()).unwrap_or_default();
                self.form.set_category(Some(previous));
            }
            KeyCode::Backspace => {
                if let Some(text) = self.form.text_mut(field) {
                    text.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(text) = self.form.text_mut(field) {
                    text.push(ch);
                }
            }
            _ => {}
        }
    }
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("UI loop failed: {:?}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code, key.modifiers) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let summary = expense_tracker::summarize(&app.visible);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    match app.current_page {
        Page::Expenses => render_table(f, content[0], &app.visible, &mut app.state),
        Page::Filters => render_filters(f, content[0], app),
        Page::Form => render_form(f, content[0], app),
    }
    render_summary(f, content[1], &summary);

    render_status_bar(f, chunks[2], app);
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let pages = [Page::Expenses, Page::Filters, Page::Form];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Stored: {}", app.book.expenses().len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Shown: {}", app.visible.len()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Personal Expense Tracker "),
    );

    f.render_widget(header, area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Food => Color::Green,
        Category::Travel => Color::Cyan,
        Category::Bills => Color::Red,
        Category::Other => Color::Magenta,
    }
}

fn render_table(f: &mut Frame, area: Rect, visible: &[Expense], state: &mut TableState) {
    if visible.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Track your first expense",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  Press 'a' to add one (or 'c' to clear filters).",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Expenses "),
        );
        f.render_widget(empty, area);
        return;
    }

    let header_cells = ["Amount", "Date", "Note", "Category"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = visible.iter().map(|e| {
        let note = if e.note.is_empty() { "-".to_string() } else { truncate(&e.note, 32) };
        Row::new(vec![
            Cell::from(format!("{:>12}", format_list_amount(e.amount))),
            Cell::from(e.date.clone()),
            Cell::from(note),
            Cell::from(e.category.as_str()).style(Style::default().fg(category_color(e.category))),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &Summary) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total Spent: ", label),
            Span::styled(
                format_summary_amount(summary.total),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    for item in &summary.per_category {
        let color = category_color(item.category);
        content.push(Line::from(vec![
            Span::styled(format!("  {:<8}", item.category.as_str()), Style::default().fg(color)),
            Span::raw(format!("{:>4}%  ", item.percentage)),
            Span::raw(format_summary_amount(item.total)),
        ]));
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(progress_bar(item.percentage, 20), Style::default().fg(color)),
        ]));
        content.push(Line::from(""));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Summary "),
    );

    f.render_widget(panel, area);
}

fn field_line(label: &str, value: String, focused: bool, error: Option<&str>) -> Vec<Line<'static>> {
    let marker = if focused { "→ " } else { "  " };
    let value_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::Cyan)),
        Span::styled(value, value_style),
    ])];
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("            {}", message),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn render_form<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let form = &app.form;
    let mut content = vec![Line::from("")];

    for field in FormField::ALL {
        let value = match form.text(field) {
            Some(text) => format!("{}▏", text),
            None => match form.input().category {
                Some(category) => format!("◀ {} ▶", category),
                None => "◀ (none) ▶".to_string(),
            },
        };
        content.extend(field_line(
            field.label(),
            value,
            app.form_field == field,
            form.error_for(field),
        ));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        if form.is_edit() {
            "  Enter: Update Expense   Esc: Cancel"
        } else {
            "  Enter: Add Expense   Esc: Back"
        },
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let title = if form.is_edit() { " Edit Expense " } else { " Add Expense " };
    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn render_filters<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let criteria = app.book.criteria();
    let mut content = vec![Line::from("")];

    content.extend(field_line(
        "Category",
        format!("◀ {} ▶", criteria.category_label()),
        app.filter_field == FilterField::Category,
        None,
    ));
    content.push(Line::from(""));
    content.extend(field_line(
        "From",
        format!("{}▏", criteria.date_from),
        app.filter_field == FilterField::From,
        None,
    ));
    content.push(Line::from(""));
    content.extend(field_line(
        "To",
        format!("{}▏", criteria.date_to),
        app.filter_field == FilterField::To,
        None,
    ));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Dates as YYYY-MM-DD, both ends inclusive. Enter/Esc: back",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let key = Style::default().fg(Color::Yellow);
    let mut status_spans = vec![];

    if app.book.criteria().is_active() {
        status_spans.push(Span::styled(" Filtered ", Style::default().fg(Color::Green)));
        status_spans.push(Span::raw("("));
        status_spans.push(Span::styled("c", key));
        status_spans.push(Span::raw(" clear) | "));
    }

    let hints: &[(&str, &str)] = match app.current_page {
        Page::Expenses => &[
            ("a", " Add | "),
            ("e", " Edit | "),
            ("d", " Delete | "),
            ("f", " Filters | "),
            ("↑/↓", " Nav | "),
        ],
        Page::Filters => &[("Tab", " Field | "), ("←/→", " Category | ")],
        Page::Form => &[("Tab", " Field | "), ("←/→", " Category | "), ("Enter", " Save | ")],
    };
    for (k, text) in hints {
        status_spans.push(Span::styled(*k, key));
        status_spans.push(Span::raw(*text));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn progress_bar(percentage: i64, width: usize) -> String {
    let filled = (percentage.clamp(0, 100) as usize * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
