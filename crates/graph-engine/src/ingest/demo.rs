use crate::store::GraphInstallation;

const CITIES: [&str; 10] = [
    "London",
    "Paris",
    "Berlin",
    "Rome",
    "Madrid",
    "Athens",
    "Amsterdam",
    "Brussels",
    "Lisbon",
    "Prague",
];

const ROUTES: [(u32, u32); 11] = [
    (0, 1),
    (0, 6),
    (1, 7),
    (1, 4),
    (1, 3),
    (1, 2),
    (2, 6),
    (2, 9),
    (4, 8),
    (5, 9),
    (6, 7),
];

/// Small undirected, unweighted graph a session starts with.
pub fn european_cities() -> GraphInstallation {
    GraphInstallation::named(
        CITIES.iter().map(|c| c.to_string()).collect(),
        ROUTES.to_vec(),
        None,
        false,
    )
}
