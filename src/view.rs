// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Draws viewable objects into a terminal window.

use crate::activity::Report;
use crate::count::UserStat;

/// Marks an item that can be converted into a string for display on a terminal.
pub trait Viewable {
    /// Converts the item into a string for display on a terminal.
    fn view(&self) -> String;
}

impl Viewable for Report {
    fn view(&self) -> String {
        let mut lines = vec![String::new(), String::from("Top users by number of posts:")];
        lines.extend(ranking(self.top_posters(), "posts"));
        lines.push(String::new());
        lines.push(String::from("Top users by number of comments:"));
        lines.extend(ranking(self.top_commenters(), "comments"));
        lines.join("\n")
    }
}

fn ranking<'a>(stats: &'a [UserStat], unit: &'a str) -> impl Iterator<Item = String> + 'a {
    stats.iter().enumerate().map(move |(i, stat)| {
        let rank = i + 1;
        format!("{rank}. {}: {} {unit}", stat.username(), stat.count())
    })
}
