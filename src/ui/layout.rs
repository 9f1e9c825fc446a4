use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub form: Rect,
    pub domain_field: Rect,
    pub record_field: Rect,
    pub actions: Rect,
    pub list: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(vertical[1]);

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(main_chunks[0]);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        form: main_chunks[0],
        domain_field: form_chunks[0],
        record_field: form_chunks[1],
        actions: form_chunks[2],
        list: main_chunks[1],
        status_line: footer_chunks[0],
        command_line: footer_chunks[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_fit_inside_terminal() {
        let size = Rect::new(0, 0, 100, 30);
        let areas = areas(size);
        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.status_line.height, 1);
        assert_eq!(areas.command_line.height, 1);
        assert_eq!(areas.domain_field.height, 3);
        assert!(areas.list.x >= areas.form.x + areas.form.width);
        assert_eq!(
            areas.header.height + areas.main.height + 2,
            size.height
        );
    }
}
