use super::repo_types::User;

/// Something that can log in with an email and a password.
pub trait Authenticatable {
    fn login_email(&self) -> &str;
    fn check_password(&self, plain: &str) -> bool;
    fn has_usable_password(&self) -> bool;
}

/// Account flags consulted by authorization checks.
pub trait Permissioned {
    fn is_active(&self) -> bool;
    fn is_staff(&self) -> bool;
    fn is_superuser(&self) -> bool;

    /// Active staff may use the admin endpoints.
    fn has_admin_access(&self) -> bool {
        self.is_active() && self.is_staff()
    }

    /// Only superusers may touch superuser accounts.
    fn can_manage(&self, target: &dyn Permissioned) -> bool {
        self.is_superuser() || !target.is_superuser()
    }

    /// Granting or revoking `is_staff` / `is_superuser` is reserved for
    /// superusers.
    fn can_grant_privileges(&self) -> bool {
        self.is_superuser()
    }
}

impl Authenticatable for User {
    fn login_email(&self) -> &str {
        &self.email
    }

    fn check_password(&self, plain: &str) -> bool {
        User::check_password(self, plain)
    }

    fn has_usable_password(&self) -> bool {
        User::has_usable_password(self)
    }
}

impl Permissioned for User {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flags {
        active: bool,
        staff: bool,
        superuser: bool,
    }

    impl Permissioned for Flags {
        fn is_active(&self) -> bool {
            self.active
        }
        fn is_staff(&self) -> bool {
            self.staff
        }
        fn is_superuser(&self) -> bool {
            self.superuser
        }
    }

    fn flags(active: bool, staff: bool, superuser: bool) -> Flags {
        Flags {
            active,
            staff,
            superuser,
        }
    }

    #[test]
    fn admin_access_needs_active_staff() {
        assert!(flags(true, true, false).has_admin_access());
        assert!(!flags(false, true, false).has_admin_access());
        assert!(!flags(true, false, false).has_admin_access());
    }

    #[test]
    fn superuser_accounts_need_a_superuser() {
        let staff = flags(true, true, false);
        let root = flags(true, true, true);

        assert!(staff.can_manage(&flags(true, false, false)));
        assert!(!staff.can_manage(&root));
        assert!(root.can_manage(&flags(true, true, true)));

        assert!(!staff.can_grant_privileges());
        assert!(root.can_grant_privileges());
    }
}
