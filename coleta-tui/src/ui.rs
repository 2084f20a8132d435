use coleta_core::{CollectionPoint, ContactChannel, DetailState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, HomeFocus, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("coleta – find a waste collection point")
        .block(Block::default().borders(Borders::ALL).title("Coleta"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Home => draw_home(frame, app, *content_area),
        Screen::Points => draw_points(frame, app, *content_area),
        Screen::Detail => draw_detail(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match (app.screen, app.focus) {
        (Screen::Home, HomeFocus::Regions) => {
            "↑/↓ move · Enter select state · r reload · q/Ctrl-C quit"
        }
        (Screen::Home, HomeFocus::Cities) => {
            "↑/↓ move · Enter find points · r reload · ←/Esc states · q quit"
        }
        (Screen::Points, _) => {
            "↑/↓ point · ←/→ item · Space toggle · Enter details · r retry · Esc back · q quit"
        }
        (Screen::Detail, _) => "w WhatsApp · m e-mail · r retry · Esc back · q quit",
    };

    let notice = app
        .explorer
        .notice()
        .map(|notice| {
            if notice.retryable {
                format!("{} (press r to retry)", notice.message)
            } else {
                notice.message.clone()
            }
        })
        .or_else(|| app.hint.clone());

    let status_text = if let Some(msg) = &notice {
        format!("{msg} · {nav_hint}")
    } else if app.explorer.is_loading() {
        format!("Loading… · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if notice.is_some() {
        Style::default().fg(Color::Red)
    } else if app.explorer.is_loading() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

fn draw_home(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [regions_area, cities_area] = chunks else {
        return;
    };

    let regions = app
        .explorer
        .regions()
        .iter()
        .map(|region| ListItem::new(format!("{} – {}", region.code, region.name)))
        .collect::<Vec<ListItem<'_>>>();

    let regions_title = if app.focus == HomeFocus::Regions {
        "Select state (↑/↓, Enter)"
    } else {
        "State"
    };
    let region_list = List::new(regions)
        .block(Block::default().borders(Borders::ALL).title(regions_title))
        .highlight_style(highlight())
        .highlight_symbol("> ");

    let mut region_state = ListState::default();
    if !app.explorer.regions().is_empty() {
        region_state.select(Some(app.region_index));
    }
    frame.render_stateful_widget(region_list, *regions_area, &mut region_state);

    let cities_title = match app.explorer.selection().region() {
        Some(code) => format!("Cities in {code}"),
        None => "Cities (select a state first)".to_owned(),
    };

    let cities = if app.explorer.cities().is_empty() && app.explorer.selection().region().is_some() {
        vec![ListItem::new("Loading cities…")]
    } else {
        app.explorer
            .cities()
            .iter()
            .map(|city| ListItem::new(city.name.clone()))
            .collect()
    };

    let city_list = List::new(cities)
        .block(Block::default().borders(Borders::ALL).title(cities_title))
        .highlight_style(highlight())
        .highlight_symbol("> ");

    let mut city_state = ListState::default();
    if app.focus == HomeFocus::Cities && !app.explorer.cities().is_empty() {
        city_state.select(Some(app.city_index));
    }
    frame.render_stateful_widget(city_list, *cities_area, &mut city_state);
}

fn draw_points(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // items
            Constraint::Length(3), // viewport
            Constraint::Min(0),    // points
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [items_area, viewport_area, points_area] = chunks else {
        return;
    };

    let item_spans = app
        .items()
        .iter()
        .enumerate()
        .flat_map(|(idx, item)| {
            let mark = if app.explorer.selection().is_item_selected(item.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let mut style = Style::default();
            if idx == app.item_index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            [
                Span::styled(format!("{mark} {}", item.title), style),
                Span::raw("  "),
            ]
        })
        .collect::<Vec<_>>();

    let items = Paragraph::new(Line::from(item_spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Items (←/→, Space to toggle, none = all)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(items, *items_area);

    let viewport = app.explorer.viewport();
    let viewport_text = format!(
        "center {:.5}, {:.5} · span {:.4}° × {:.4}°",
        viewport.center.latitude,
        viewport.center.longitude,
        viewport.span.lat_delta,
        viewport.span.lng_delta
    );
    let place = match (app.explorer.selection().city(), app.explorer.selection().region()) {
        (Some(city), Some(code)) => format!("Map of {city}, {code}"),
        _ => "Map".to_owned(),
    };
    let viewport_widget =
        Paragraph::new(viewport_text).block(Block::default().borders(Borders::ALL).title(place));
    frame.render_widget(viewport_widget, *viewport_area);

    if app.explorer.markers().is_empty() {
        let text = if app.explorer.is_loading() {
            "Loading collection points…"
        } else {
            "No collection points found for this selection."
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Points"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *points_area);
        return;
    }

    let rows = app
        .explorer
        .markers()
        .iter()
        .enumerate()
        .map(|(idx, marker)| {
            let mut style = Style::default();
            if idx == app.marker_index {
                style = highlight();
            }
            Row::new(vec![
                Cell::from(marker.title.clone()),
                Cell::from(format!("{:.5}", marker.coordinate.latitude)),
                Cell::from(format!("{:.5}", marker.coordinate.longitude)),
            ])
            .style(style)
        });

    let column_widths = [
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Point", "Lat", "Lng"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Points ({})", app.explorer.markers().len())),
        )
        .column_spacing(1);

    frame.render_widget(table, *points_area);
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Collection point (Esc/←/b to go back)");

    let lines = match app.explorer.detail() {
        DetailState::Closed => vec![Line::from("No point selected.")],
        DetailState::Loading(id) => vec![Line::from(format!("Loading point {id}…"))],
        DetailState::Unavailable(id) => vec![
            Line::styled(
                format!("Point {id} is unavailable."),
                Style::default().fg(Color::Red),
            ),
            Line::from("It may have been removed. Go back and pick another point."),
        ],
        DetailState::Failed { id, notice } => vec![
            Line::styled(
                format!("Could not load point {id}."),
                Style::default().fg(Color::Red),
            ),
            Line::from(notice.message.clone()),
            Line::from("Press r to retry."),
        ],
        DetailState::Loaded(point) => detail_lines(app, point),
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(app: &App, point: &CollectionPoint) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled(point.name.clone(), bold.fg(Color::Green)),
        Line::from(app.service.item_labels(point).join(", ")),
        Line::from(""),
        Line::styled("Address", bold),
        Line::from(format!("{}, {}", point.city, point.region_code)),
        Line::from(""),
        Line::styled("Contact", bold),
        Line::from(format!("WhatsApp: {}", point.whatsapp_number)),
        Line::from(format!("E-mail:   {}", point.email)),
        Line::from(format!("Picture:  {}", point.image_ref)),
    ];

    if let Some(contact) = &app.contact {
        let channel = match contact.channel {
            ContactChannel::WhatsApp => "WhatsApp",
            ContactChannel::Mail => "E-mail",
        };
        lines.push(Line::from(""));
        lines.push(Line::styled(format!("{channel} link"), bold));
        lines.push(Line::from(contact.link.to_string()));
    }

    lines
}
