//! Client-side route table with role guards.
//!
//! Paths are matched segment by segment; `:name` segments capture a
//! parameter. Unknown paths resolve to [`Resolution::NotFound`].

use std::collections::BTreeMap;

use emporium_client::Session;

/// Every page the front end can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Login,
    Signup,
    SignupSuccess,
    VerifyEmail,
    ForgotPassword,
    ResetPassword,
    ProductDetails,
    OrderTracking,
    Contact,
    NotFound,
    Profile,
    Orders,
    OrderDetails,
    Cart,
    Checkout,
    Payment,
    PaymentSuccess,
    DashboardOverview,
    DashboardProducts,
    DashboardCategories,
    DashboardReviews,
    DashboardUsers,
}

impl Page {
    /// Title shown for the page.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Signup => "Sign Up",
            Self::SignupSuccess => "Sign Up Complete",
            Self::VerifyEmail => "Verify Email",
            Self::ForgotPassword => "Forgot Password",
            Self::ResetPassword => "Reset Password",
            Self::ProductDetails => "Product Details",
            Self::OrderTracking => "Track Order",
            Self::Contact => "Contact",
            Self::NotFound => "Page Not Found",
            Self::Profile => "Profile",
            Self::Orders => "Orders",
            Self::OrderDetails => "Order Details",
            Self::Cart => "Cart",
            Self::Checkout => "Checkout",
            Self::Payment => "Payment",
            Self::PaymentSuccess => "Payment Successful",
            Self::DashboardOverview => "Dashboard Overview",
            Self::DashboardProducts => "Products",
            Self::DashboardCategories => "Categories",
            Self::DashboardReviews => "Reviews",
            Self::DashboardUsers => "Users",
        }
    }

    /// Whether the page is part of the admin dashboard.
    #[must_use]
    pub const fn is_dashboard(&self) -> bool {
        matches!(
            self,
            Self::DashboardOverview
                | Self::DashboardProducts
                | Self::DashboardCategories
                | Self::DashboardReviews
                | Self::DashboardUsers
        )
    }
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    /// Signed-in viewers only.
    Authenticated,
    /// Signed-in staff only.
    Admin,
}

/// The viewer a route is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Customer,
    Staff,
}

impl Viewer {
    /// Derive the viewer from the session: no token is anonymous, a token
    /// with a staff user is staff, any other token is a customer.
    pub async fn from_session(session: &Session) -> Self {
        if !session.is_authenticated().await {
            return Self::Anonymous;
        }
        match session.user().await {
            Some(user) if user.is_staff => Self::Staff,
            _ => Self::Customer,
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub page: Page,
    pub guard: Guard,
}

impl Route {
    const fn new(pattern: &'static str, page: Page, guard: Guard) -> Self {
        Self {
            pattern,
            page,
            guard,
        }
    }

    /// Match `path` against the pattern, capturing `:name` segments.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let mut pattern = segments(self.pattern);
        let mut actual = segments(path);

        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return Some(params),
                (Some(expected), Some(segment)) => {
                    if let Some(name) = expected.strip_prefix(':') {
                        params.insert(name.to_owned(), segment.to_owned());
                    } else if expected != segment {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render {
        page: Page,
        params: BTreeMap<String, String>,
    },
    Redirect(&'static str),
    NotFound,
}

/// Where guarded routes send viewers who may not see them.
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// The application's routes.
pub const ROUTES: [Route; 24] = [
    Route::new("/", Page::Home, Guard::Public),
    Route::new("/login", Page::Login, Guard::Public),
    Route::new("/signup", Page::Signup, Guard::Public),
    Route::new("/signup-success", Page::SignupSuccess, Guard::Public),
    Route::new("/verify-email/:token", Page::VerifyEmail, Guard::Public),
    Route::new("/forgot-password", Page::ForgotPassword, Guard::Public),
    Route::new("/reset-password/:token", Page::ResetPassword, Guard::Public),
    Route::new("/profile", Page::Profile, Guard::Authenticated),
    Route::new("/orders", Page::Orders, Guard::Authenticated),
    Route::new("/orders/:orderId", Page::OrderDetails, Guard::Authenticated),
    Route::new("/cart", Page::Cart, Guard::Authenticated),
    Route::new("/checkout", Page::Checkout, Guard::Authenticated),
    Route::new("/payment/:orderId", Page::Payment, Guard::Authenticated),
    Route::new(
        "/payment-success/:paymentId",
        Page::PaymentSuccess,
        Guard::Authenticated,
    ),
    Route::new("/product/:id", Page::ProductDetails, Guard::Public),
    Route::new("/track", Page::OrderTracking, Guard::Public),
    Route::new("/track/:orderNumber", Page::OrderTracking, Guard::Public),
    Route::new("/contact", Page::Contact, Guard::Public),
    Route::new("/dashboard", Page::DashboardOverview, Guard::Admin),
    Route::new("/dashboard/products", Page::DashboardProducts, Guard::Admin),
    Route::new(
        "/dashboard/categories",
        Page::DashboardCategories,
        Guard::Admin,
    ),
    Route::new("/dashboard/reviews", Page::DashboardReviews, Guard::Admin),
    Route::new("/dashboard/users", Page::DashboardUsers, Guard::Admin),
    Route::new("/404", Page::NotFound, Guard::Public),
];

/// Ordered route table; the first matching route wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            routes: ROUTES.to_vec(),
        }
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve `path` (query string and fragment ignored) for `viewer`.
    #[must_use]
    pub fn resolve(&self, path: &str, viewer: Viewer) -> Resolution {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let Some((route, params)) = self
            .routes
            .iter()
            .find_map(|route| route.matches(path).map(|params| (route, params)))
        else {
            return Resolution::NotFound;
        };

        match (route.guard, viewer) {
            (Guard::Authenticated | Guard::Admin, Viewer::Anonymous) => {
                Resolution::Redirect(LOGIN_PATH)
            }
            (Guard::Admin, Viewer::Customer) => Resolution::Redirect(HOME_PATH),
            _ => Resolution::Render {
                page: route.page,
                params,
            },
        }
    }
}
