//! Database schema definition for the SQLite store.

/// Database schema definition.
///
/// Timestamps are RFC 3339 text with fixed microsecond precision, so that
/// lexical order equals chronological order.
pub(crate) const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE RESTRICT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    context TEXT,
    decision TEXT,
    consequences TEXT,
    status TEXT NOT NULL DEFAULT 'Backlog'
        CHECK (status IN ('Backlog', 'To Do', 'In Progress', 'In Review', 'Done', 'Cancelled')),
    is_ai_generated INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tickets_project ON tickets(project_id);
CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);

CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email TEXT UNIQUE,
    username TEXT UNIQUE
);

-- Many-to-many assignment of people to tickets
CREATE TABLE IF NOT EXISTS ticket_people (
    ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
    person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    PRIMARY KEY (ticket_id, person_id)
);

CREATE INDEX IF NOT EXISTS idx_ticket_people_person ON ticket_people(person_id);

-- Directed dependency edges: ticket_id depends on depends_on_ticket_id
CREATE TABLE IF NOT EXISTS ticket_dependencies (
    ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
    depends_on_ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
    PRIMARY KEY (ticket_id, depends_on_ticket_id),
    CHECK (ticket_id <> depends_on_ticket_id)
);

CREATE INDEX IF NOT EXISTS idx_ticket_dependencies_target
    ON ticket_dependencies(depends_on_ticket_id);
";
