//! Static catalog, reward list and default user loaded at session start.

use crate::catalog::Catalog;
use crate::domain::{
    Activity, ActivityCategory, ActivityStatus, LedgerConstants, LedgerState, Reward, User,
    UserRole,
};

/// Points the seeded user starts with.
pub const SEED_POINTS: u64 = 120;

struct SeedActivity {
    id: &'static str,
    title: &'static str,
    title_en: &'static str,
    organizer: &'static str,
    date: &'static str,
    time: &'static str,
    location: &'static str,
    category: ActivityCategory,
    description: &'static str,
    description_en: &'static str,
    tags: &'static [&'static str],
    registered_count: u32,
    max_capacity: u32,
}

const ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        id: "A1",
        title: "人工智能前沿讲座",
        title_en: "Frontiers of AI Lecture",
        organizer: "信息科学技术学院",
        date: "2024-05-20",
        time: "14:00-16:00",
        location: "理科一号楼 1131",
        category: ActivityCategory::Academic,
        description: "邀请业内专家分享大模型研究的最新进展，并与同学们进行现场问答交流。",
        description_en: "Industry experts share recent progress in large-model research, followed by a live Q&A.",
        tags: &["AI", "讲座"],
        registered_count: 86,
        max_capacity: 120,
    },
    SeedActivity {
        id: "A2",
        title: "未名湖夜跑",
        title_en: "Weiming Lake Night Run",
        organizer: "校跑步协会",
        date: "2024-05-22",
        time: "19:30-21:00",
        location: "未名湖畔",
        category: ActivityCategory::Sports,
        description: "环湖五公里夜跑，配速分组，新手友好，结束后有补给。",
        description_en: "A 5 km evening loop around the lake with pace groups. Beginners welcome, snacks afterwards.",
        tags: &["跑步", "健康"],
        registered_count: 40,
        max_capacity: 60,
    },
    SeedActivity {
        id: "A3",
        title: "春季校园招聘会",
        title_en: "Spring Career Fair",
        organizer: "学生就业指导服务中心",
        date: "2024-05-25",
        time: "09:00-16:00",
        location: "邱德拔体育馆",
        category: ActivityCategory::Career,
        description: "百余家企业现场招聘，覆盖互联网、金融、制造等行业，请携带简历。",
        description_en: "Over a hundred employers hiring on site across tech, finance and manufacturing. Bring your CV.",
        tags: &["求职", "实习"],
        registered_count: 300,
        max_capacity: 300,
    },
    SeedActivity {
        id: "A4",
        title: "国际文化节",
        title_en: "International Culture Festival",
        organizer: "国际合作部",
        date: "2024-05-26",
        time: "10:00-17:00",
        location: "百周年纪念讲堂广场",
        category: ActivityCategory::Culture,
        description: "来自四十多个国家的同学展示家乡美食、音乐与传统服饰。",
        description_en: "Students from over forty countries share food, music and traditional dress from home.",
        tags: &["文化", "国际"],
        registered_count: 150,
        max_capacity: 500,
    },
    SeedActivity {
        id: "A5",
        title: "社区支教志愿活动",
        title_en: "Community Tutoring Volunteers",
        organizer: "青年志愿者协会",
        date: "2024-05-28",
        time: "13:30-17:30",
        location: "海淀区社区中心",
        category: ActivityCategory::Volunteer,
        description: "为社区儿童提供课业辅导和兴趣课程，需参加一次行前培训。",
        description_en: "Homework help and hobby classes for neighbourhood children. One training session required.",
        tags: &["志愿", "教育"],
        registered_count: 18,
        max_capacity: 30,
    },
    SeedActivity {
        id: "A6",
        title: "新生桌游之夜",
        title_en: "Freshman Board Game Night",
        organizer: "桌游社",
        date: "2024-05-30",
        time: "19:00-22:00",
        location: "学生活动中心 208",
        category: ActivityCategory::Social,
        description: "轻松的桌游社交夜，认识新朋友，社团提供全部游戏和零食。",
        description_en: "A relaxed board game evening to meet new friends. Games and snacks provided.",
        tags: &["社交", "桌游"],
        registered_count: 25,
        max_capacity: 40,
    },
];

/// Seeded activities, in display order.
pub fn seed_activities() -> Vec<Activity> {
    ACTIVITIES
        .iter()
        .map(|a| Activity {
            id: a.id.to_string(),
            title: a.title.to_string(),
            title_en: Some(a.title_en.to_string()),
            organizer: a.organizer.to_string(),
            date: a.date.to_string(),
            time: a.time.to_string(),
            location: a.location.to_string(),
            category: a.category,
            description: a.description.to_string(),
            description_en: Some(a.description_en.to_string()),
            image: format!("https://picsum.photos/seed/{}/400/300", a.id),
            external_link: None,
            tags: a.tags.iter().map(|t| t.to_string()).collect(),
            registered_count: a.registered_count,
            max_capacity: a.max_capacity,
            status: Some(ActivityStatus::Upcoming),
        })
        .collect()
}

pub fn seed_rewards() -> Vec<Reward> {
    vec![
        Reward {
            id: "coffee".to_string(),
            title: "咖啡兑换券".to_string(),
            cost: 100,
            icon: "☕".to_string(),
            description: "校园咖啡厅任意饮品一杯".to_string(),
        },
        Reward {
            id: "library-seat".to_string(),
            title: "图书馆研讨间预约".to_string(),
            cost: 200,
            icon: "📚".to_string(),
            description: "优先预约研讨间两小时".to_string(),
        },
        Reward {
            id: "hoodie".to_string(),
            title: "纪念卫衣".to_string(),
            cost: 500,
            icon: "👕".to_string(),
            description: "限量版校园纪念卫衣".to_string(),
        },
    ]
}

pub fn seed_user() -> User {
    let mut user = User::new("Li Hua", UserRole::UndergradLow, SEED_POINTS);
    user.preferences = vec![ActivityCategory::Academic, ActivityCategory::Career];
    user
}

/// The seeded session state: default user, full catalog, reward list.
pub fn seeded_state() -> LedgerState {
    LedgerState {
        user: seed_user(),
        catalog: Catalog::from_seed(seed_activities()),
        rewards: seed_rewards(),
        constants: LedgerConstants::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::validate_state;

    #[test]
    fn seed_catalog_passes_validation() {
        assert!(Catalog::new(seed_activities()).is_ok());
    }

    #[test]
    fn seeded_state_is_consistent() {
        let state = seeded_state();
        validate_state(&state).unwrap();
        assert_eq!(state.user.points, SEED_POINTS);
        assert!(state.reward("coffee").is_some());
        assert_eq!(state.catalog.len(), ACTIVITIES.len());
    }
}
